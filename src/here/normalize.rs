//! Response normalizers
//!
//! Reshape raw HERE JSON into the compact payload each tool returns. Empty
//! result sets are business failures ([`ToolOutcome::Failure`]); bodies that
//! do not match the documented shape are hard errors.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::error::{MapsError, Result};
use crate::polyline;
use crate::tools::{SearchPlacesArgs, ToolOutcome, ToolRequest, TrafficIncidentsArgs};

/// At most this many traffic incidents are returned, in upstream order
pub const TRAFFIC_INCIDENT_LIMIT: usize = 10;

/// Decimal digits kept for decoded route geometry
pub const ROUTE_COORDINATE_DECIMALS: u32 = 5;

/// Category reported for places without one
pub const UNKNOWN_CATEGORY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Deserialize)]
struct Address {
    label: String,
}

#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GeocodeItem {
    id: String,
    position: Position,
    address: Address,
}

#[derive(Debug, Serialize)]
struct GeocodeResult {
    location: Position,
    address: String,
    id: String,
}

#[derive(Debug, Serialize)]
struct ReverseGeocodeResult {
    address: String,
    location: Position,
    id: String,
}

#[derive(Debug, Deserialize)]
struct RoutesResponse {
    routes: Vec<Route>,
}

#[derive(Debug, Deserialize)]
struct Route {
    sections: Vec<Section>,
}

#[derive(Debug, Deserialize)]
struct Section {
    summary: RouteSummary,
    polyline: String,
    #[serde(default)]
    actions: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RouteSummary {
    duration: Number,
    length: Number,
}

#[derive(Debug, Serialize)]
struct DirectionsResult {
    summary: RouteSummary,
    polyline: Vec<polyline::Coordinate>,
    actions: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct PlaceItem {
    title: String,
    address: Address,
    position: Position,
    #[serde(default)]
    categories: Vec<Category>,
}

#[derive(Debug, Deserialize)]
struct Category {
    name: String,
}

#[derive(Debug, Serialize)]
struct PlaceResult {
    name: String,
    address: String,
    location: Position,
    category: String,
}

#[derive(Debug, Deserialize)]
struct IncidentsResponse {
    results: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentResult {
    incident_details: IncidentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IncidentDetails {
    #[serde(default)]
    description: Value,
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    criticality: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IncidentSummary {
    description: Value,
    start_time: Option<String>,
    end_time: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    criticality: Option<String>,
}

/// Normalize the body returned for a fetched tool request
pub fn normalize(request: &ToolRequest, body: &Value) -> Result<ToolOutcome> {
    match request {
        ToolRequest::Geocode(_) => geocode(body),
        ToolRequest::ReverseGeocode(_) => reverse_geocode(body),
        ToolRequest::Directions(_) => directions(body),
        ToolRequest::SearchPlaces(args) => search_places(body, args),
        ToolRequest::TrafficIncidents(args) => traffic_incidents(body, args),
        ToolRequest::Display(_) => Err(MapsError::MalformedResponse(
            "maps_display does not fetch a response".to_string(),
        )),
    }
}

pub fn geocode(body: &Value) -> Result<ToolOutcome> {
    let response: ItemsResponse<GeocodeItem> = parse(body, "geocode")?;
    let Some(first) = response.items.into_iter().next() else {
        return Ok(ToolOutcome::failure("no results found"));
    };

    success(GeocodeResult {
        location: first.position,
        address: first.address.label,
        id: first.id,
    })
}

pub fn reverse_geocode(body: &Value) -> Result<ToolOutcome> {
    let response: ItemsResponse<GeocodeItem> = parse(body, "reverse geocode")?;
    let Some(first) = response.items.into_iter().next() else {
        return Ok(ToolOutcome::failure("no results found"));
    };

    success(ReverseGeocodeResult {
        address: first.address.label,
        location: first.position,
        id: first.id,
    })
}

pub fn directions(body: &Value) -> Result<ToolOutcome> {
    let response: RoutesResponse = parse(body, "routing")?;
    let Some(route) = response.routes.into_iter().next() else {
        return Ok(ToolOutcome::failure("no routes found"));
    };
    let section = route
        .sections
        .into_iter()
        .next()
        .ok_or_else(|| MapsError::MalformedResponse("route has no sections".to_string()))?;

    let polyline = polyline::Decoder::new(&section.polyline)?
        .map(|coordinate| coordinate.map(|c| c.rounded(ROUTE_COORDINATE_DECIMALS)))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    success(DirectionsResult {
        summary: section.summary,
        polyline,
        actions: section.actions,
    })
}

pub fn search_places(body: &Value, args: &SearchPlacesArgs) -> Result<ToolOutcome> {
    let response: ItemsResponse<PlaceItem> = parse(body, "discover")?;
    if response.items.is_empty() {
        return Ok(ToolOutcome::failure(format!(
            "no places found for query: {}",
            args.query
        )));
    }

    let places: Vec<PlaceResult> = response
        .items
        .into_iter()
        .map(|item| PlaceResult {
            name: item.title,
            address: item.address.label,
            location: item.position,
            category: item
                .categories
                .into_iter()
                .next()
                .map(|c| c.name)
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
        })
        .collect();

    success(places)
}

pub fn traffic_incidents(body: &Value, args: &TrafficIncidentsArgs) -> Result<ToolOutcome> {
    let response: IncidentsResponse = parse(body, "traffic incidents")?;
    if response.results.is_empty() {
        return Ok(ToolOutcome::failure(format!(
            "no traffic incidents found in radius {} around {}",
            args.radius, args.center
        )));
    }

    let incidents = response
        .results
        .into_iter()
        .take(TRAFFIC_INCIDENT_LIMIT)
        .map(|raw| {
            let result: IncidentResult = parse(&raw, "traffic incident")?;
            let details = result.incident_details;
            Ok(IncidentSummary {
                description: description_text(details.description),
                start_time: details.start_time,
                end_time: details.end_time,
                kind: details.kind,
                criticality: details.criticality,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    success(incidents)
}

/// Payload for `maps_display`
pub fn display(image_url: String) -> ToolOutcome {
    ToolOutcome::Success(serde_json::json!({ "image_url": image_url }))
}

// Incident descriptions arrive as `{ "value": "...", "language": "..." }`
fn description_text(description: Value) -> Value {
    match description {
        Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
        other => other,
    }
}

fn parse<T: DeserializeOwned>(body: &Value, what: &str) -> Result<T> {
    T::deserialize(body).map_err(|e| MapsError::MalformedResponse(format!("{} response: {}", what, e)))
}

fn success<T: Serialize>(payload: T) -> Result<ToolOutcome> {
    Ok(ToolOutcome::Success(serde_json::to_value(payload)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn berlin_item() -> Value {
        json!({
            "title": "Rosenthaler Straße 39, 10178 Berlin, Deutschland",
            "id": "here:pds:place:abc",
            "resultType": "houseNumber",
            "address": { "label": "Rosenthaler Straße 39, 10178 Berlin", "city": "Berlin" },
            "position": { "lat": 52.52427, "lng": 13.4026 },
            "scoring": { "queryScore": 1.0 }
        })
    }

    fn payload(outcome: ToolOutcome) -> Value {
        match outcome {
            ToolOutcome::Success(value) => value,
            ToolOutcome::Failure(message) => panic!("unexpected failure: {}", message),
        }
    }

    fn traffic_args() -> TrafficIncidentsArgs {
        TrafficIncidentsArgs {
            center: "52.5,13.4".to_string(),
            radius: 1000.0,
        }
    }

    #[test]
    fn test_geocode_first_match() {
        let second = json!({
            "id": "here:other",
            "address": { "label": "Elsewhere" },
            "position": { "lat": 1.0, "lng": 2.0 }
        });
        let outcome = geocode(&json!({ "items": [berlin_item(), second] })).unwrap();
        assert_eq!(
            payload(outcome),
            json!({
                "location": { "lat": 52.52427, "lng": 13.4026 },
                "address": "Rosenthaler Straße 39, 10178 Berlin",
                "id": "here:pds:place:abc"
            })
        );
    }

    #[test]
    fn test_geocode_empty() {
        let outcome = geocode(&json!({ "items": [] })).unwrap();
        assert_eq!(outcome, ToolOutcome::failure("no results found"));
    }

    #[test]
    fn test_geocode_missing_items_is_malformed() {
        let err = geocode(&json!({ "error": "Unauthorized" })).unwrap_err();
        assert!(matches!(err, MapsError::MalformedResponse(_)));
    }

    #[test]
    fn test_reverse_geocode_field_order() {
        let outcome = reverse_geocode(&json!({ "items": [berlin_item()] })).unwrap();
        let text = serde_json::to_string(&payload(outcome)).unwrap();
        let address = text.find("\"address\"").unwrap();
        let location = text.find("\"location\"").unwrap();
        assert!(address < location);
    }

    #[test]
    fn test_reverse_geocode_empty() {
        let outcome = reverse_geocode(&json!({ "items": [] })).unwrap();
        assert_eq!(outcome, ToolOutcome::failure("no results found"));
    }

    #[test]
    fn test_directions_decodes_and_rounds_polyline() {
        let body = json!({
            "routes": [{
                "id": "r1",
                "sections": [{
                    "id": "s1",
                    "type": "vehicle",
                    "summary": { "duration": 169, "length": 1206, "baseDuration": 120 },
                    "polyline": "BFoz5xJ67i1B1B7PzIhaxL7Y",
                    "actions": [
                        { "action": "depart", "duration": 50, "instruction": "Head east", "offset": 0 },
                        { "action": "arrive", "duration": 0, "instruction": "Arrive", "offset": 3 }
                    ]
                }]
            }]
        });

        let result = payload(directions(&body).unwrap());
        assert_eq!(result["summary"], json!({ "duration": 169, "length": 1206 }));
        assert_eq!(result["polyline"][0], json!([50.10228, 8.69821]));
        assert_eq!(result["polyline"].as_array().unwrap().len(), 4);
        assert_eq!(result["actions"].as_array().unwrap().len(), 2);
        assert_eq!(result["actions"][0]["action"], "depart");
    }

    #[test]
    fn test_directions_empty() {
        let outcome = directions(&json!({ "routes": [] })).unwrap();
        assert_eq!(outcome, ToolOutcome::failure("no routes found"));
    }

    #[test]
    fn test_directions_bad_polyline() {
        let body = json!({
            "routes": [{
                "sections": [{
                    "summary": { "duration": 1, "length": 1 },
                    "polyline": "BFoz5xJ67i1B1B7PzIhaxL7"
                }]
            }]
        });
        let err = directions(&body).unwrap_err();
        assert!(matches!(err, MapsError::Polyline(_)));
    }

    #[test]
    fn test_directions_no_sections() {
        let err = directions(&json!({ "routes": [{ "sections": [] }] })).unwrap_err();
        assert!(matches!(err, MapsError::MalformedResponse(_)));
    }

    #[test]
    fn test_search_places_maps_every_item() {
        let body = json!({
            "items": [
                {
                    "title": "Bonanza Coffee",
                    "address": { "label": "Oderberger Str. 35, 10435 Berlin" },
                    "position": { "lat": 52.53, "lng": 13.41 },
                    "categories": [
                        { "id": "100-1100-0010", "name": "Coffee Shop", "primary": true },
                        { "id": "100-1000-0000", "name": "Restaurant" }
                    ]
                },
                {
                    "title": "Nameless Kiosk",
                    "address": { "label": "Somewhere 1, Berlin" },
                    "position": { "lat": 52.51, "lng": 13.39 }
                }
            ]
        });
        let args = SearchPlacesArgs {
            latitude: 52.5,
            longitude: 13.4,
            query: "coffee".to_string(),
        };

        let places = payload(search_places(&body, &args).unwrap());
        assert_eq!(places.as_array().unwrap().len(), 2);
        assert_eq!(
            places[0],
            json!({
                "name": "Bonanza Coffee",
                "address": "Oderberger Str. 35, 10435 Berlin",
                "location": { "lat": 52.53, "lng": 13.41 },
                "category": "Coffee Shop"
            })
        );
        assert_eq!(places[1]["category"], "Unknown");
    }

    #[test]
    fn test_search_places_empty() {
        let args = SearchPlacesArgs {
            latitude: 0.0,
            longitude: 0.0,
            query: "unicorns".to_string(),
        };
        let outcome = search_places(&json!({ "items": [] }), &args).unwrap();
        assert_eq!(outcome, ToolOutcome::failure("no places found for query: unicorns"));
    }

    fn incident(n: usize) -> Value {
        json!({
            "location": { "length": 100 },
            "incidentDetails": {
                "id": format!("incident-{}", n),
                "description": { "value": format!("Incident {}", n), "language": "en" },
                "startTime": "2024-05-01T08:00:00Z",
                "endTime": "2024-05-01T18:00:00Z",
                "type": "construction",
                "criticality": "minor"
            }
        })
    }

    #[test]
    fn test_traffic_incidents_truncates_to_limit_in_order() {
        let results: Vec<Value> = (0..15).map(incident).collect();
        let incidents = payload(traffic_incidents(&json!({ "results": results }), &traffic_args()).unwrap());
        let incidents = incidents.as_array().unwrap();

        assert_eq!(incidents.len(), TRAFFIC_INCIDENT_LIMIT);
        for (i, item) in incidents.iter().enumerate() {
            assert_eq!(item["description"], format!("Incident {}", i));
        }
        assert_eq!(
            incidents[0],
            json!({
                "description": "Incident 0",
                "startTime": "2024-05-01T08:00:00Z",
                "endTime": "2024-05-01T18:00:00Z",
                "type": "construction",
                "criticality": "minor"
            })
        );
    }

    #[test]
    fn test_traffic_incidents_fewer_than_limit() {
        let results: Vec<Value> = (0..3).map(incident).collect();
        let incidents = payload(traffic_incidents(&json!({ "results": results }), &traffic_args()).unwrap());
        assert_eq!(incidents.as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_traffic_incidents_plain_description_and_missing_fields() {
        let body = json!({
            "results": [{ "incidentDetails": { "description": "Lane closed" } }]
        });
        let incidents = payload(traffic_incidents(&body, &traffic_args()).unwrap());
        assert_eq!(incidents[0]["description"], "Lane closed");
        assert!(incidents[0]["startTime"].is_null());
        assert!(incidents[0]["criticality"].is_null());
    }

    #[test]
    fn test_traffic_incidents_empty() {
        let outcome = traffic_incidents(&json!({ "results": [] }), &traffic_args()).unwrap();
        assert_eq!(
            outcome,
            ToolOutcome::failure("no traffic incidents found in radius 1000 around 52.5,13.4")
        );
    }

    #[test]
    fn test_display_payload() {
        let outcome = display("https://image.example/map.png".to_string());
        assert_eq!(
            payload(outcome),
            json!({ "image_url": "https://image.example/map.png" })
        );
    }

    #[test]
    fn test_normalize_dispatches_by_request() {
        let request = ToolRequest::Geocode(crate::tools::GeocodeArgs {
            address: "Berlin".to_string(),
        });
        let outcome = normalize(&request, &json!({ "items": [berlin_item()] })).unwrap();
        assert!(outcome.is_success());
    }
}
