//! HTTP seam to the HERE APIs
//!
//! [`MapsHttp`] is the only place network I/O happens. [`HereHttpClient`] is
//! the reqwest-backed implementation; [`MockMapsHttp`] serves scripted
//! responses for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::Value;

use crate::error::{MapsError, Result};

use super::request::OutboundRequest;

/// Performs one GET request and returns the decoded JSON body
#[async_trait]
pub trait MapsHttp: Send + Sync {
    async fn get_json(&self, request: &OutboundRequest) -> Result<Value>;
}

/// reqwest-backed client
#[derive(Debug, Clone)]
pub struct HereHttpClient {
    client: Client,
}

impl HereHttpClient {
    /// Create a client; `None` keeps the transport's default timeout behavior
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| MapsError::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl MapsHttp for HereHttpClient {
    async fn get_json(&self, request: &OutboundRequest) -> Result<Value> {
        let response = self
            .client
            .get(&request.endpoint)
            .query(&request.query)
            .send()
            .await?;

        let status = response.status();
        debug!("GET {} -> {}", request, status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(MapsError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| MapsError::MalformedResponse(e.without_url().to_string()))
    }
}

#[derive(Debug, Clone)]
enum MockReply {
    Json(Value),
    Fail(String),
}

/// Scripted [`MapsHttp`] that records every request it receives
#[derive(Debug)]
pub struct MockMapsHttp {
    reply: MockReply,
    requests: Mutex<Vec<OutboundRequest>>,
}

impl MockMapsHttp {
    /// Answer every request with this body
    pub fn with_json(body: Value) -> Self {
        Self {
            reply: MockReply::Json(body),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Fail every request as a network error would
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            reply: MockReply::Fail(message.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests().len()
    }
}

#[async_trait]
impl MapsHttp for MockMapsHttp {
    async fn get_json(&self, request: &OutboundRequest) -> Result<Value> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.clone());

        match &self.reply {
            MockReply::Json(body) => Ok(body.clone()),
            MockReply::Fail(message) => Err(MapsError::Http(message.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_builds_without_timeout() {
        assert!(HereHttpClient::new(None).is_ok());
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(HereHttpClient::new(Some(Duration::from_secs(5))).is_ok());
    }

    #[tokio::test]
    async fn test_mock_returns_body_and_records() {
        let mock = MockMapsHttp::with_json(json!({ "items": [] }));
        let request = OutboundRequest::new("https://example.com").param("q", "x");

        let body = mock.get_json(&request).await.unwrap();
        assert_eq!(body, json!({ "items": [] }));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.requests()[0].get("q"), Some("x"));
    }

    #[tokio::test]
    async fn test_mock_failing() {
        let mock = MockMapsHttp::failing("connection refused");
        let err = mock
            .get_json(&OutboundRequest::new("https://example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, MapsError::Http(_)));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_host_is_http_error_without_key() {
        // Reserve a port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let client = HereHttpClient::new(Some(Duration::from_secs(2))).unwrap();
        let request = OutboundRequest::new(format!("http://127.0.0.1:{}/v1/geocode", port))
            .param("apiKey", "secret-key");

        let err = client.get_json(&request).await.unwrap_err();
        assert!(matches!(err, MapsError::Http(_)));
        assert!(!err.to_string().contains("secret-key"));
    }
}
