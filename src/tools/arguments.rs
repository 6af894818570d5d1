//! Typed tool arguments
//!
//! Incoming arguments are untyped JSON; each tool decodes them into its own
//! struct. A mismatch surfaces as [`MapsError::InvalidArguments`].

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{MapsError, Result};

use super::definition::{MapStyle, MapTool, TransportMode};

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GeocodeArgs {
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReverseGeocodeArgs {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionsArgs {
    pub origin: String,
    pub destination: String,
    pub transport_mode: TransportMode,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchPlacesArgs {
    pub latitude: f64,
    pub longitude: f64,
    pub query: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TrafficIncidentsArgs {
    pub center: String,
    pub radius: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayArgs {
    pub center: String,
    pub zoom_level: f64,
    pub style: MapStyle,
}

/// A tool invocation with its arguments decoded
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Geocode(GeocodeArgs),
    ReverseGeocode(ReverseGeocodeArgs),
    Directions(DirectionsArgs),
    SearchPlaces(SearchPlacesArgs),
    TrafficIncidents(TrafficIncidentsArgs),
    Display(DisplayArgs),
}

impl ToolRequest {
    /// Decode raw arguments for the given tool
    pub fn parse(tool: MapTool, arguments: Value) -> Result<Self> {
        // A missing arguments object reads as an empty one
        let arguments = if arguments.is_null() {
            Value::Object(Default::default())
        } else {
            arguments
        };

        Ok(match tool {
            MapTool::Geocode => Self::Geocode(decode(tool, arguments)?),
            MapTool::ReverseGeocode => Self::ReverseGeocode(decode(tool, arguments)?),
            MapTool::Directions => Self::Directions(decode(tool, arguments)?),
            MapTool::SearchPlaces => Self::SearchPlaces(decode(tool, arguments)?),
            MapTool::TrafficIncidents => Self::TrafficIncidents(decode(tool, arguments)?),
            MapTool::Display => Self::Display(decode(tool, arguments)?),
        })
    }

    /// Which tool this request is for
    pub fn tool(&self) -> MapTool {
        match self {
            Self::Geocode(_) => MapTool::Geocode,
            Self::ReverseGeocode(_) => MapTool::ReverseGeocode,
            Self::Directions(_) => MapTool::Directions,
            Self::SearchPlaces(_) => MapTool::SearchPlaces,
            Self::TrafficIncidents(_) => MapTool::TrafficIncidents,
            Self::Display(_) => MapTool::Display,
        }
    }
}

fn decode<T: DeserializeOwned>(tool: MapTool, arguments: Value) -> Result<T> {
    serde_json::from_value(arguments).map_err(|e| MapsError::InvalidArguments {
        tool: tool.name().to_string(),
        reason: e.to_string(),
    })
}
