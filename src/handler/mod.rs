//! Request handler module
//!
//! Routing dispatch, the chat handler and the static-asset service.

pub mod chat;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
