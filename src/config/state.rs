// Application state module
// Shared, read-only state handed to every connection

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use super::types::Config;
use crate::handler::chat::ChatHandler;
use crate::inference::InferenceBackend;

/// Application state
pub struct AppState {
    pub config: Config,
    pub chat: ChatHandler,

    // Cached config values for fast access without locks
    pub cached_access_log: Arc<AtomicBool>,
}

impl AppState {
    /// Create `AppState` with the given inference backend
    pub fn new(config: &Config, backend: Arc<dyn InferenceBackend>) -> Self {
        let chat = ChatHandler::new(
            config.chat.clone(),
            &config.security,
            config.http.max_body_size,
            backend,
        );

        Self {
            config: config.clone(),
            chat,
            cached_access_log: Arc::new(AtomicBool::new(config.logging.access_log)),
        }
    }
}
