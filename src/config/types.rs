// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub assets: AssetsConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    /// Upper bound for a whole connection, streaming included (seconds)
    pub connection_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct HttpConfig {
    /// Largest accepted chat request body, in bytes
    pub max_body_size: u64,
}

/// Static asset configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AssetsConfig {
    /// Directory the static-asset collaborator serves from
    pub dir: String,
    pub index_files: Vec<String>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            dir: "public".to_string(),
            index_files: vec!["index.html".to_string(), "index.htm".to_string()],
        }
    }
}

/// Chat endpoint and generation settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ChatConfig {
    /// Paths starting with this prefix are never handed to the asset service
    pub api_prefix: String,
    pub path: String,
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api/".to_string(),
            path: "/api/chat".to_string(),
            model: "@cf/meta/llama-3.1-8b-instruct-fp8".to_string(),
            system_prompt: "You are a helpful, friendly assistant. Provide concise and accurate responses."
                .to_string(),
            max_tokens: 1024,
        }
    }
}

/// Which mitigation actions reported upstream cause a block
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ActionPolicy {
    /// Any non-empty action blocks
    #[default]
    AnyAction,
    /// Only the listed actions block (compared case-insensitively)
    Listed { actions: Vec<String> },
}

/// Pre-inference security gate settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SecurityConfig {
    pub mitigation_header: String,
    pub threat_score_header: String,
    /// Scores at or above this value block the request
    pub threat_threshold: i64,
    pub action_policy: ActionPolicy,
    /// Substrings of an inference error that mark it as a policy rejection
    pub policy_markers: Vec<String>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            mitigation_header: "cf-mitigated".to_string(),
            threat_score_header: "cf-threat-score".to_string(),
            threat_threshold: 90,
            action_policy: ActionPolicy::AnyAction,
            policy_markers: vec![
                "policy violation".to_string(),
                "safety".to_string(),
                "content blocked".to_string(),
            ],
        }
    }
}

/// Inference service connection settings
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct InferenceConfig {
    pub api_base: String,
    pub gateway_base: String,
    pub account_id: String,
    pub api_token: String,
    /// Ask the service for a server-sent event stream
    pub stream: bool,
    pub timeout_secs: Option<u64>,
    pub gateway: Option<GatewayConfig>,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            gateway_base: "https://gateway.ai.cloudflare.com/v1".to_string(),
            account_id: String::new(),
            api_token: String::new(),
            stream: true,
            timeout_secs: None,
            gateway: None,
        }
    }
}

/// AI Gateway routing options
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub id: String,
    #[serde(default)]
    pub skip_cache: bool,
    #[serde(default)]
    pub cache_ttl: Option<u64>,
}
