//! HERE API layer - credential, endpoints, request translation, HTTP and
//! response normalization

mod auth;
mod client;
mod endpoints;
pub mod normalize;
mod request;

pub use auth::ApiKey;
pub use client::{HereHttpClient, MapsHttp, MockMapsHttp};
pub use endpoints::{Endpoints, MapImageEndpoint};
pub use request::{API_KEY_PARAM, OutboundRequest, Translation, Translator};
