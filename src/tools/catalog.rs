//! Static tool catalog
//!
//! The six tool definitions advertised on `tools/list`, built once and read
//! thereafter.

use std::collections::HashMap;

use serde_json::{Value, json};

use super::definition::{MapStyle, MapTool, ToolDefinition, TransportMode};

/// Ordered, immutable registry of tool definitions
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolCatalog {
    /// Catalog with every [`MapTool`] in advertisement order
    pub fn builtin() -> Self {
        let tools: Vec<ToolDefinition> = MapTool::ALL.into_iter().map(definition_for).collect();
        let index = tools
            .iter()
            .enumerate()
            .map(|(i, tool)| (tool.name.clone(), i))
            .collect();
        Self { tools, index }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&ToolDefinition> {
        self.index.get(name).map(|&i| &self.tools[i])
    }

    /// All definitions, in advertisement order
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// All tool names, in advertisement order
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn definition_for(tool: MapTool) -> ToolDefinition {
    let (description, schema) = match tool {
        MapTool::Geocode => (
            "Convert an address or place name into geographic coordinates",
            object_schema(
                json!({
                    "address": string_param("The address or place name to geocode")
                }),
                &["address"],
            ),
        ),
        MapTool::ReverseGeocode => (
            "Convert geographic coordinates into the nearest address",
            object_schema(
                json!({
                    "latitude": number_param("Latitude in decimal degrees"),
                    "longitude": number_param("Longitude in decimal degrees")
                }),
                &["latitude", "longitude"],
            ),
        ),
        MapTool::Directions => (
            "Calculate a route between two points, returning summary, geometry and maneuvers",
            object_schema(
                json!({
                    "origin": string_param("Starting point as \"latitude,longitude\""),
                    "destination": string_param("End point as \"latitude,longitude\""),
                    "transportMode": enum_param(
                        "Mode of transport",
                        TransportMode::ALL.iter().map(|m| m.as_str()),
                    )
                }),
                &["origin", "destination", "transportMode"],
            ),
        ),
        MapTool::SearchPlaces => (
            "Search for places matching a free-text query near a position",
            object_schema(
                json!({
                    "latitude": number_param("Latitude of the search center"),
                    "longitude": number_param("Longitude of the search center"),
                    "query": string_param("What to search for (e.g. \"coffee\")")
                }),
                &["latitude", "longitude", "query"],
            ),
        ),
        MapTool::TrafficIncidents => (
            "List traffic incidents within a radius around a center point",
            object_schema(
                json!({
                    "center": string_param("Center point as \"latitude,longitude\""),
                    "radius": number_param("Search radius in meters")
                }),
                &["center", "radius"],
            ),
        ),
        MapTool::Display => (
            "Build a static map image URL for a center point, zoom level and style",
            object_schema(
                json!({
                    "center": string_param("Map center as \"latitude,longitude\""),
                    "zoomLevel": number_param("Zoom level (0-20)"),
                    "style": enum_param("Map style", MapStyle::ALL.iter().map(|s| s.as_str()))
                }),
                &["center", "zoomLevel", "style"],
            ),
        ),
    };

    ToolDefinition::new(tool.name(), description).with_schema(schema)
}

fn object_schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

fn string_param(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn number_param(description: &str) -> Value {
    json!({ "type": "number", "description": description })
}

fn enum_param<'a>(description: &str, values: impl Iterator<Item = &'a str>) -> Value {
    json!({
        "type": "string",
        "description": description,
        "enum": values.collect::<Vec<_>>()
    })
}
