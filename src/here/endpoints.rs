//! Upstream endpoint locations
//!
//! Defaults point at the public HERE hosts; configuration may override any of
//! them (e.g. to route through a proxy).

use serde::{Deserialize, Serialize};

const GEOCODE_URL: &str = "https://geocode.search.hereapi.com/v1/geocode";
const REVGEOCODE_URL: &str = "https://revgeocode.search.hereapi.com/v1/revgeocode";
const ROUTES_URL: &str = "https://router.hereapi.com/v8/routes";
const DISCOVER_URL: &str = "https://discover.search.hereapi.com/v1/discover";
const INCIDENTS_URL: &str = "https://data.traffic.hereapi.com/v7/incidents";
const MAP_IMAGE_URL: &str = "https://image.maps.hereapi.com/mia/v3/base";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocode: String,
    pub revgeocode: String,
    pub routes: String,
    pub discover: String,
    pub incidents: String,
    pub map_image: MapImageEndpoint,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocode: GEOCODE_URL.to_string(),
            revgeocode: REVGEOCODE_URL.to_string(),
            routes: ROUTES_URL.to_string(),
            discover: DISCOVER_URL.to_string(),
            incidents: INCIDENTS_URL.to_string(),
            map_image: MapImageEndpoint::default(),
        }
    }
}

/// Static map image host plus the fixed image parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapImageEndpoint {
    pub base_url: String,
    /// `{width}x{height}` in pixels
    pub size: String,
    pub format: String,
}

impl Default for MapImageEndpoint {
    fn default() -> Self {
        Self {
            base_url: MAP_IMAGE_URL.to_string(),
            size: "512x512".to_string(),
            format: "png8".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_endpoints() {
        let endpoints = Endpoints::default();
        assert_eq!(endpoints.geocode, GEOCODE_URL);
        assert!(endpoints.routes.starts_with("https://router.hereapi.com"));
        assert_eq!(endpoints.map_image.size, "512x512");
        assert_eq!(endpoints.map_image.format, "png8");
    }

    #[test]
    fn test_partial_override() {
        let yaml = r#"
routes: http://localhost:9000/routes
map_image:
  size: 1024x768
"#;
        let endpoints: Endpoints = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(endpoints.routes, "http://localhost:9000/routes");
        assert_eq!(endpoints.geocode, GEOCODE_URL);
        assert_eq!(endpoints.map_image.size, "1024x768");
        assert_eq!(endpoints.map_image.base_url, MAP_IMAGE_URL);
    }
}
