//! Logger module
//!
//! Thin facade over `tracing` so call sites stay one-liners:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Chat gate decisions and failures
//!
//! Nothing here can fail the request path: events go through the subscriber and
//! access lines through a sink that swallows write errors.

mod format;
pub mod writer;

pub use format::AccessLogEntry;

use crate::config::Config;
use std::net::SocketAddr;
use std::sync::Mutex;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber and access log sink
///
/// Should be called once at application startup. `RUST_LOG` overrides
/// `logging.level` when set.
pub fn init(config: &Config) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    let make_writer = match config.logging.error_log_file.as_deref() {
        Some(path) => BoxMakeWriter::new(Mutex::new(writer::open_log_file(path)?)),
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(make_writer)
        .with_target(false)
        .try_init()
        .map_err(std::io::Error::other)?;

    writer::init(config.logging.access_log_file.as_deref())
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!(
        listen = %addr,
        level = %config.logging.level,
        workers = ?config.server.workers,
        max_connections = ?config.performance.max_connections,
        "chat gate started"
    );
    tracing::info!(
        chat_path = %config.chat.path,
        model = %config.chat.model,
        assets = %config.assets.dir,
        gateway = ?config.inference.gateway.as_ref().map(|g| g.id.as_str()),
        "routes ready"
    );
    if config.inference.api_token.is_empty() || config.inference.account_id.is_empty() {
        log_warning("inference account_id or api_token not set; chat requests will fail");
    }
}

pub fn log_shutdown() {
    tracing::info!("shutdown signal received, no longer accepting connections");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!(peer = %peer_addr, "connection accepted");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!(error = ?err, "failed to serve connection");
}

pub fn log_info(message: &str) {
    tracing::info!("{message}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

/// A request stopped by the pre-inference gate
pub fn log_chat_blocked(action: Option<&str>, threat_score: Option<i64>) {
    tracing::warn!(action = ?action, threat_score = ?threat_score, "chat request blocked by security gate");
}

/// A chat request that failed after the gate; `policy` marks a sniffed rejection
pub fn log_chat_failure(error: &dyn std::error::Error, policy: bool) {
    tracing::error!(error = %error, policy_rejection = policy, "chat request failed");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    writer::write_access(&entry.format(format));
}
