// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub performance: PerformanceConfig,
    pub logging: LoggingConfig,
    pub pages: PagesConfig,
    /// Static directories and the URL prefixes they are mounted under
    #[serde(default)]
    pub mounts: Vec<MountConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Tokio worker threads (defaults to the number of CPU cores)
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Upper bound on a connection's lifetime, in seconds
    pub connection_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<usize>,
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

/// Error and not-found page configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PagesConfig {
    /// Template rendered for 404s; must display `{{ path }}`
    pub not_found_template: String,
    /// Template rendered for 500s; must display `{{ message }}`
    pub error_template: String,
    pub default_message: String,
    /// Show callers' error messages instead of `default_message`
    pub display_errors: bool,
    /// Path the error page itself is mounted on (empty disables it)
    #[serde(default)]
    pub error_path: Option<String>,
}

/// A static directory mount
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct MountConfig {
    /// URL prefix, with leading and trailing slash (e.g. `/static/`)
    pub url_prefix: String,
    pub directory: String,
}
