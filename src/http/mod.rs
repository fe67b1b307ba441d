//! HTTP protocol layer module
//!
//! Provides the shared response body type and response builders, decoupled from
//! the chat and static-asset logic.

pub mod cache;
pub mod mime;
pub mod response;

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;

/// Error type carried by streamed response bodies
pub type BodyError = Box<dyn std::error::Error + Send + Sync>;

/// Response body used across the server: buffered for local responses,
/// streamed for inference passthrough
pub type ResponseBody = UnsyncBoxBody<Bytes, BodyError>;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_generic_failure_response,
    build_options_response, build_policy_violation_response,
};

/// Wrap a complete buffer as a response body
pub fn full<T: Into<Bytes>>(chunk: T) -> ResponseBody {
    Full::new(chunk.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Empty response body
pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}
