//! Request translators
//!
//! Turn a decoded [`ToolRequest`] into either an outbound GET request or,
//! for `maps_display`, a finished image URL.

use std::fmt;

use log::debug;
use reqwest::Url;

use crate::error::{MapsError, Result};
use crate::tools::{
    DirectionsArgs, DisplayArgs, GeocodeArgs, ReverseGeocodeArgs, SearchPlacesArgs, ToolRequest,
    TrafficIncidentsArgs,
};

use super::auth::ApiKey;
use super::endpoints::Endpoints;

/// Query parameter carrying the credential
pub const API_KEY_PARAM: &str = "apiKey";

/// Fields the routing API is asked to return
const ROUTE_RETURN_FIELDS: &str = "summary,polyline,actions,instructions";

/// A GET request against one of the upstream endpoints
#[derive(Clone, PartialEq, Eq)]
pub struct OutboundRequest {
    pub endpoint: String,
    pub query: Vec<(String, String)>,
}

impl OutboundRequest {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            query: Vec::new(),
        }
    }

    /// Append a query parameter
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Value of the first query parameter with this key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// Display and Debug both leave the credential out
impl fmt::Display for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.endpoint)?;
        let mut separator = '?';
        for (key, value) in &self.query {
            if key == API_KEY_PARAM {
                continue;
            }
            write!(f, "{}{}={}", separator, key, value)?;
            separator = '&';
        }
        Ok(())
    }
}

impl fmt::Debug for OutboundRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OutboundRequest({})", self)
    }
}

/// Result of translating a tool request
#[derive(Debug, Clone, PartialEq)]
pub enum Translation {
    /// Issue this request and normalize the JSON it returns
    Fetch(OutboundRequest),
    /// No network call; the URL is the result
    ImageUrl(String),
}

/// Builds outbound requests from decoded tool arguments
#[derive(Debug, Clone, Copy)]
pub struct Translator<'a> {
    endpoints: &'a Endpoints,
    api_key: &'a ApiKey,
}

impl<'a> Translator<'a> {
    pub fn new(endpoints: &'a Endpoints, api_key: &'a ApiKey) -> Self {
        Self { endpoints, api_key }
    }

    pub fn translate(&self, request: &ToolRequest) -> Result<Translation> {
        let translation = match request {
            ToolRequest::Geocode(args) => Translation::Fetch(self.geocode(args)),
            ToolRequest::ReverseGeocode(args) => Translation::Fetch(self.reverse_geocode(args)),
            ToolRequest::Directions(args) => Translation::Fetch(self.directions(args)),
            ToolRequest::SearchPlaces(args) => Translation::Fetch(self.search_places(args)),
            ToolRequest::TrafficIncidents(args) => Translation::Fetch(self.traffic_incidents(args)),
            ToolRequest::Display(args) => Translation::ImageUrl(self.display_url(args)?),
        };

        if let Translation::Fetch(outbound) = &translation {
            debug!("{} -> GET {}", request.tool(), outbound);
        }
        Ok(translation)
    }

    fn get(&self, endpoint: &str) -> OutboundRequest {
        OutboundRequest::new(endpoint)
    }

    fn authorize(&self, request: OutboundRequest) -> OutboundRequest {
        request.param(API_KEY_PARAM, self.api_key.expose())
    }

    pub fn geocode(&self, args: &GeocodeArgs) -> OutboundRequest {
        self.authorize(self.get(&self.endpoints.geocode).param("q", &args.address))
    }

    pub fn reverse_geocode(&self, args: &ReverseGeocodeArgs) -> OutboundRequest {
        self.authorize(
            self.get(&self.endpoints.revgeocode)
                .param("at", lat_lng(args.latitude, args.longitude)),
        )
    }

    pub fn directions(&self, args: &DirectionsArgs) -> OutboundRequest {
        self.authorize(
            self.get(&self.endpoints.routes)
                .param("transportMode", args.transport_mode.as_str())
                .param("origin", &args.origin)
                .param("destination", &args.destination)
                .param("return", ROUTE_RETURN_FIELDS),
        )
    }

    pub fn search_places(&self, args: &SearchPlacesArgs) -> OutboundRequest {
        self.authorize(
            self.get(&self.endpoints.discover)
                .param("at", lat_lng(args.latitude, args.longitude))
                .param("q", &args.query),
        )
    }

    pub fn traffic_incidents(&self, args: &TrafficIncidentsArgs) -> OutboundRequest {
        self.authorize(
            self.get(&self.endpoints.incidents)
                .param("in", format!("circle:{};r={}", args.center, args.radius))
                .param("locationReferencing", "none"),
        )
    }

    /// Static map image URL; embedded whitespace in the center is dropped
    pub fn display_url(&self, args: &DisplayArgs) -> Result<String> {
        let image = &self.endpoints.map_image;
        let center: String = args.center.chars().filter(|c| !c.is_whitespace()).collect();

        let mut url = Url::parse(&image.base_url)
            .map_err(|e| MapsError::InvalidUrl(format!("{}: {}", image.base_url, e)))?;
        url.path_segments_mut()
            .map_err(|_| MapsError::InvalidUrl(format!("{} cannot be a base URL", image.base_url)))?
            .pop_if_empty()
            .push("mc")
            .push(&format!("center:{};zoom={}", center, args.zoom_level))
            .push(&image.size)
            .push(&image.format);
        url.query_pairs_mut()
            .append_pair(API_KEY_PARAM, self.api_key.expose())
            .append_pair("style", args.style.as_str());

        Ok(url.into())
    }
}

fn lat_lng(latitude: f64, longitude: f64) -> String {
    format!("{},{}", latitude, longitude)
}
