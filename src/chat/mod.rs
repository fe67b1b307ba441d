//! Chat domain: messages, the security gate and failure classification.
//!
//! Pure logic with no I/O; the HTTP side lives in `handler::chat`.

pub mod error;
pub mod gate;
pub mod message;

pub use error::{classify, ChatError, FailureKind};
pub use gate::{SecurityGate, Verdict};
pub use message::{ensure_system_message, ChatMessage, ChatPayload};
