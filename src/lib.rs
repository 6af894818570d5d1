//! here-maps-mcp - HERE mapping APIs as MCP tools
//!
//! Exposes geocoding, reverse geocoding, routing, place search, traffic
//! incidents and static map URLs to language-model agents. Each call is
//! translated into one HERE API request and the response is reshaped into a
//! compact JSON payload wrapped in a uniform result envelope.

pub mod error;
pub mod here;
pub mod mcp;
pub mod polyline;
pub mod tools;

pub use error::{MapsError, Result};
