//! Tool routing and execution
//!
//! Defines the ToolDispatcher trait the host transport talks to and
//! MapToolRouter, which serves the six map tools against the HERE APIs.

use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use serde_json::Value;

use crate::error::Result;
use crate::here::{ApiKey, Endpoints, MapsHttp, Translation, Translator, normalize};

use super::arguments::ToolRequest;
use super::catalog::ToolCatalog;
use super::definition::{MapTool, ToolDefinition};
use super::outcome::{ResultEnvelope, ToolOutcome};

/// Trait for listing and dispatching tool calls
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Definitions to advertise, in order
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Run one tool call; never fails, errors become error envelopes
    async fn dispatch(&self, name: &str, arguments: Value) -> ResultEnvelope;
}

/// Serves the map tools through an injectable HTTP client
pub struct MapToolRouter {
    catalog: ToolCatalog,
    http: Arc<dyn MapsHttp>,
    endpoints: Endpoints,
    api_key: ApiKey,
}

impl MapToolRouter {
    /// Create a router against the default HERE endpoints
    pub fn new(http: Arc<dyn MapsHttp>, api_key: ApiKey) -> Self {
        Self {
            catalog: ToolCatalog::builtin(),
            http,
            endpoints: Endpoints::default(),
            api_key,
        }
    }

    /// Use custom endpoint locations
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Translate, fetch and normalize a single call
    async fn execute(&self, tool: MapTool, arguments: Value) -> Result<ToolOutcome> {
        let request = ToolRequest::parse(tool, arguments)?;
        let translator = Translator::new(&self.endpoints, &self.api_key);

        match translator.translate(&request)? {
            Translation::ImageUrl(url) => Ok(normalize::display(url)),
            Translation::Fetch(outbound) => {
                let body = self.http.get_json(&outbound).await?;
                normalize::normalize(&request, &body)
            }
        }
    }
}

#[async_trait]
impl ToolDispatcher for MapToolRouter {
    fn definitions(&self) -> Vec<ToolDefinition> {
        self.catalog.definitions().to_vec()
    }

    async fn dispatch(&self, name: &str, arguments: Value) -> ResultEnvelope {
        let Some(tool) = MapTool::from_name(name) else {
            warn!("Unknown tool requested: {}", name);
            return ResultEnvelope::error(format!("Unknown tool: {}", name));
        };

        match self.execute(tool, arguments).await {
            Ok(outcome) => {
                if let ToolOutcome::Failure(message) = &outcome {
                    debug!("{} found nothing: {}", tool, message);
                }
                outcome.into()
            }
            Err(e) => {
                warn!("{} failed: {}", tool, e);
                ResultEnvelope::error(format!("Error: {}", e))
            }
        }
    }
}

impl std::fmt::Debug for MapToolRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapToolRouter")
            .field("tools", &self.catalog.len())
            .field("endpoints", &self.endpoints)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::here::MockMapsHttp;
    use serde_json::json;

    fn router(mock: Arc<MockMapsHttp>) -> MapToolRouter {
        MapToolRouter::new(mock, ApiKey::new("test-key"))
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let mock = Arc::new(MockMapsHttp::with_json(json!({})));
        let envelope = router(mock.clone()).dispatch("maps_teleport", json!({})).await;

        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Unknown tool: maps_teleport");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_geocode_success() {
        let mock = Arc::new(MockMapsHttp::with_json(json!({
            "items": [{
                "id": "here:pds:place:abc",
                "address": { "label": "Rosenthaler Straße 39, 10178 Berlin" },
                "position": { "lat": 52.52427, "lng": 13.4026 }
            }]
        })));
        let envelope = router(mock.clone())
            .dispatch("maps_geocode", json!({ "address": "Central Berlin, Germany" }))
            .await;

        assert!(!envelope.is_error);
        assert_eq!(envelope.json().unwrap()["id"], "here:pds:place:abc");
        assert_eq!(mock.requests()[0].get("q"), Some("Central Berlin, Germany"));
    }

    #[tokio::test]
    async fn test_invalid_arguments_become_error_envelope() {
        let mock = Arc::new(MockMapsHttp::with_json(json!({ "items": [] })));
        let envelope = router(mock.clone()).dispatch("maps_geocode", json!({ "addr": "x" })).await;

        assert!(envelope.is_error);
        assert!(envelope.text().starts_with("Error: "));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_network_failure_becomes_error_envelope() {
        let mock = Arc::new(MockMapsHttp::failing("connection reset"));
        let envelope = router(mock)
            .dispatch("maps_reverse_geocode", json!({ "latitude": 1.0, "longitude": 2.0 }))
            .await;

        assert!(envelope.is_error);
        assert_eq!(envelope.text(), "Error: HTTP error: connection reset");
    }

    #[tokio::test]
    async fn test_display_skips_network() {
        let mock = Arc::new(MockMapsHttp::failing("should not be called"));
        let envelope = router(mock.clone())
            .dispatch(
                "maps_display",
                json!({ "center": "52.5,13.4", "zoomLevel": 14, "style": "explore.day" }),
            )
            .await;

        assert!(!envelope.is_error);
        assert_eq!(mock.call_count(), 0);
        let url = envelope.json().unwrap()["image_url"].as_str().unwrap().to_string();
        assert!(url.contains("center:52.5,13.4;zoom=14"));
    }

    #[tokio::test]
    async fn test_custom_endpoints_are_used() {
        let mock = Arc::new(MockMapsHttp::with_json(json!({ "routes": [] })));
        let endpoints = Endpoints {
            routes: "http://localhost:9999/routes".to_string(),
            ..Endpoints::default()
        };
        let envelope = router(mock.clone())
            .with_endpoints(endpoints)
            .dispatch(
                "maps_directions",
                json!({ "origin": "1,2", "destination": "3,4", "transportMode": "car" }),
            )
            .await;

        assert_eq!(envelope.text(), "no routes found");
        assert_eq!(mock.requests()[0].endpoint, "http://localhost:9999/routes");
    }

    #[test]
    fn test_definitions_match_catalog() {
        let mock = Arc::new(MockMapsHttp::with_json(json!({})));
        let router = router(mock);
        assert_eq!(router.definitions().len(), 6);
        assert_eq!(router.definitions()[0].name, "maps_geocode");
    }
}
