//! Tool identifiers and advertised definitions
//!
//! [`MapTool`] is the closed set of tools the router knows how to serve;
//! [`ToolDefinition`] is what gets advertised to the calling agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Every tool the server exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapTool {
    Geocode,
    ReverseGeocode,
    Directions,
    SearchPlaces,
    TrafficIncidents,
    Display,
}

impl MapTool {
    /// All tools, in advertisement order
    pub const ALL: [MapTool; 6] = [
        MapTool::Geocode,
        MapTool::ReverseGeocode,
        MapTool::Directions,
        MapTool::SearchPlaces,
        MapTool::TrafficIncidents,
        MapTool::Display,
    ];

    /// Wire name of the tool
    pub fn name(self) -> &'static str {
        match self {
            Self::Geocode => "maps_geocode",
            Self::ReverseGeocode => "maps_reverse_geocode",
            Self::Directions => "maps_directions",
            Self::SearchPlaces => "maps_search_places",
            Self::TrafficIncidents => "maps_get_traffic_incidents",
            Self::Display => "maps_display",
        }
    }

    /// Look up a tool by wire name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }

    /// Whether serving this tool reaches the upstream service
    pub fn requires_network(self) -> bool {
        !matches!(self, Self::Display)
    }
}

impl std::fmt::Display for MapTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Routing transport mode accepted by `maps_directions`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    Car,
    Pedestrian,
    Bicycle,
    Truck,
    Scooter,
    Bus,
    Taxi,
}

impl TransportMode {
    pub const ALL: [TransportMode; 7] = [
        TransportMode::Car,
        TransportMode::Pedestrian,
        TransportMode::Bicycle,
        TransportMode::Truck,
        TransportMode::Scooter,
        TransportMode::Bus,
        TransportMode::Taxi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Car => "car",
            Self::Pedestrian => "pedestrian",
            Self::Bicycle => "bicycle",
            Self::Truck => "truck",
            Self::Scooter => "scooter",
            Self::Bus => "bus",
            Self::Taxi => "taxi",
        }
    }
}

/// Named map image style accepted by `maps_display`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapStyle {
    #[serde(rename = "explore.day")]
    ExploreDay,
    #[serde(rename = "explore.night")]
    ExploreNight,
    #[serde(rename = "explore.satellite.day")]
    ExploreSatelliteDay,
    #[serde(rename = "lite.day")]
    LiteDay,
    #[serde(rename = "lite.night")]
    LiteNight,
    #[serde(rename = "lite.satellite.day")]
    LiteSatelliteDay,
    #[serde(rename = "logistics.day")]
    LogisticsDay,
    #[serde(rename = "logistics.night")]
    LogisticsNight,
    #[serde(rename = "logistics.satellite.day")]
    LogisticsSatelliteDay,
    #[serde(rename = "satellite.day")]
    SatelliteDay,
    #[serde(rename = "topo.day")]
    TopoDay,
    #[serde(rename = "topo.night")]
    TopoNight,
}

impl MapStyle {
    pub const ALL: [MapStyle; 12] = [
        MapStyle::ExploreDay,
        MapStyle::ExploreNight,
        MapStyle::ExploreSatelliteDay,
        MapStyle::LiteDay,
        MapStyle::LiteNight,
        MapStyle::LiteSatelliteDay,
        MapStyle::LogisticsDay,
        MapStyle::LogisticsNight,
        MapStyle::LogisticsSatelliteDay,
        MapStyle::SatelliteDay,
        MapStyle::TopoDay,
        MapStyle::TopoNight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExploreDay => "explore.day",
            Self::ExploreNight => "explore.night",
            Self::ExploreSatelliteDay => "explore.satellite.day",
            Self::LiteDay => "lite.day",
            Self::LiteNight => "lite.night",
            Self::LiteSatelliteDay => "lite.satellite.day",
            Self::LogisticsDay => "logistics.day",
            Self::LogisticsNight => "logistics.night",
            Self::LogisticsSatelliteDay => "logistics.satellite.day",
            Self::SatelliteDay => "satellite.day",
            Self::TopoDay => "topo.day",
            Self::TopoNight => "topo.night",
        }
    }
}

/// A tool as advertised on `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Tool name (e.g., "maps_geocode")
    pub name: String,
    /// Human-readable description for the agent
    pub description: String,
    /// JSON schema for input parameters
    pub input_schema: Value,
}

impl ToolDefinition {
    /// Create a new tool definition with an empty object schema
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: serde_json::json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        }
    }

    /// Set input schema
    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    /// Names listed under `required` in the schema
    pub fn required_params(&self) -> Vec<&str> {
        self.input_schema["required"]
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_tool_names_are_unique() {
        let mut names: Vec<&str> = MapTool::ALL.iter().map(|t| t.name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), MapTool::ALL.len());
    }

    #[test]
    fn test_map_tool_from_name() {
        for tool in MapTool::ALL {
            assert_eq!(MapTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(MapTool::from_name("maps_teleport"), None);
        assert_eq!(MapTool::from_name("MAPS_GEOCODE"), None);
    }

    #[test]
    fn test_map_tool_requires_network() {
        assert!(MapTool::Geocode.requires_network());
        assert!(MapTool::TrafficIncidents.requires_network());
        assert!(!MapTool::Display.requires_network());
    }

    #[test]
    fn test_map_tool_display() {
        assert_eq!(MapTool::TrafficIncidents.to_string(), "maps_get_traffic_incidents");
    }

    #[test]
    fn test_transport_mode_serde_matches_as_str() {
        for mode in TransportMode::ALL {
            let json = serde_json::to_value(mode).unwrap();
            assert_eq!(json, mode.as_str());
        }
        let mode: TransportMode = serde_json::from_str("\"pedestrian\"").unwrap();
        assert_eq!(mode, TransportMode::Pedestrian);
        assert!(serde_json::from_str::<TransportMode>("\"rocket\"").is_err());
    }

    #[test]
    fn test_map_style_serde_matches_as_str() {
        for style in MapStyle::ALL {
            let json = serde_json::to_value(style).unwrap();
            assert_eq!(json, style.as_str());
        }
        let style: MapStyle = serde_json::from_str("\"logistics.satellite.day\"").unwrap();
        assert_eq!(style, MapStyle::LogisticsSatelliteDay);
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition::new("maps_geocode", "Geocode an address");
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["name"], "maps_geocode");
        assert!(json["inputSchema"].is_object());
        assert!(json.get("input_schema").is_none());
    }

    #[test]
    fn test_tool_definition_required_params() {
        let def = ToolDefinition::new("t", "d").with_schema(serde_json::json!({
            "type": "object",
            "properties": { "a": { "type": "string" } },
            "required": ["a"]
        }));
        assert_eq!(def.required_params(), vec!["a"]);
        assert!(ToolDefinition::new("t", "d").required_params().is_empty());
    }
}
