//! Inference collaborator
//!
//! The chat handler only sees [`InferenceBackend`]; the hosted model is reached
//! through [`workers_ai::WorkersAiClient`].

#[cfg(test)]
pub mod mock;
pub mod workers_ai;

use crate::chat::ChatMessage;
use crate::http::ResponseBody;
use async_trait::async_trait;
use hyper::Response;
use thiserror::Error;

pub use workers_ai::WorkersAiClient;

/// Error type for inference calls. The display text is what the chat handler
/// inspects for policy markers.
#[derive(Debug, Clone, Error)]
pub enum InferenceError {
    #[error("inference backend not configured: {0}")]
    NotConfigured(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("inference service returned {status}: {message}")]
    Upstream { status: u16, message: String },
}

/// One model invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    /// Hand back the transport response untouched so it can be streamed
    pub raw_response: bool,
}

#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Run the model. On success the response is returned ready to forward.
    async fn run(&self, request: InferenceRequest) -> Result<Response<ResponseBody>, InferenceError>;
}
