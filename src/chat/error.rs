//! Chat request failure taxonomy and classification

use crate::inference::InferenceError;
use thiserror::Error;

/// Anything that can go wrong after the security gate let a request through
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("failed to read request body: {0}")]
    BodyRead(String),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: u64 },

    #[error("malformed chat payload: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error(transparent)]
    Inference(#[from] InferenceError),
}

/// How a failure is presented to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Shown exactly like a gate block
    PolicyRejection,
    Generic,
}

/// Sort a failure by sniffing its message for policy markers.
///
/// This is a text heuristic: it depends on wording chosen by the inference
/// service, which offers no structured rejection code. Only inference errors
/// are sniffed; request errors quote client input and are always generic.
pub fn classify(error: &ChatError, policy_markers: &[String]) -> FailureKind {
    let ChatError::Inference(inference) = error else {
        return FailureKind::Generic;
    };
    let message = inference.to_string().to_lowercase();
    let matched = policy_markers
        .iter()
        .filter(|marker| !marker.is_empty())
        .any(|marker| message.contains(&marker.to_lowercase()));

    if matched {
        FailureKind::PolicyRejection
    } else {
        FailureKind::Generic
    }
}
