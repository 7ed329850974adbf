// Configuration module entry point
// Loads, validates and describes the server configuration

mod types;

use std::collections::HashSet;
use std::net::SocketAddr;

pub use types::{
    Config, LoggingConfig, MountConfig, PagesConfig, PerformanceConfig, ServerConfig,
};

/// Log levels accepted by `logging.level`, most severe first
pub const LOG_LEVELS: [&str; 4] = ["error", "warn", "info", "debug"];

impl Config {
    /// Load configuration from specified file path (without extension)
    /// Default config file is "config.toml" when no path specified
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("PAGEKIT").separator("__"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("pages.not_found_template", "templates/notfound.html")?
            .set_default("pages.error_template", "templates/error.html")?
            .set_default("pages.default_message", "Internal Server Error")?
            .set_default("pages.display_errors", false)?
            .set_default("pages.error_path", "/error")?
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the router cannot serve correctly
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(config::ConfigError::Message(format!(
                "logging.level must be one of {LOG_LEVELS:?}, got '{}'",
                self.logging.level
            )));
        }

        if let Some(path) = self.error_path() {
            if !path.starts_with('/') {
                return Err(config::ConfigError::Message(format!(
                    "pages.error_path must start with '/', got '{path}'"
                )));
            }
        }

        let mut seen = HashSet::new();
        for mount in &self.mounts {
            let prefix = mount.url_prefix.as_str();
            if !prefix.starts_with('/') || !prefix.ends_with('/') {
                return Err(config::ConfigError::Message(format!(
                    "mount prefix must start and end with '/', got '{prefix}'"
                )));
            }
            if !seen.insert(prefix) {
                return Err(config::ConfigError::Message(format!(
                    "mount prefix '{prefix}' is configured more than once"
                )));
            }
        }

        Ok(())
    }

    /// The configured error page path, `None` when it is empty or unset
    pub fn error_path(&self) -> Option<&str> {
        self.pages.error_path.as_deref().filter(|path| !path.is_empty())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }

    /// The effective configuration as TOML, for startup diagnostics
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
