//! Root configuration.

use crate::schema::{
    AuthConfig, ConfigurationKind, LoggingConfig, ServerConfig, StorageConfig,
};
use crate::ConfigError;
use dsc_telemetry::LogFormat;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Everything the pull server needs to start.
///
/// # Example
///
/// ```
/// use dsc_config::PullServerConfig;
///
/// let config = PullServerConfig::default();
/// assert!(config.validate().is_ok());
/// assert!(!config.auth.is_enabled());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PullServerConfig {
    /// HTTP listener.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Registration-key authentication.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Collaborator backends.
    #[serde(default)]
    pub storage: StorageConfig,
}

impl PullServerConfig {
    /// Debug logging in human-readable form.
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config
    }

    /// JSON logging at info level.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }

    /// Parses the bind address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.http_addr.parse().map_err(|_| {
            ConfigError::invalid(
                "server.http_addr",
                format!("invalid socket address: {}", self.server.http_addr),
            )
        })
    }

    /// Checks values that deserialization cannot.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if self.server.max_body_bytes == 0 {
            return Err(ConfigError::invalid(
                "server.max_body_bytes",
                "must be greater than zero",
            ));
        }

        if self.server.request_timeout_ms == 0 {
            return Err(ConfigError::invalid(
                "server.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if let Some(index) = self.auth.keys.iter().position(|key| key.trim().is_empty()) {
            return Err(ConfigError::invalid(
                format!("auth.keys[{index}]"),
                "registration keys must not be empty",
            ));
        }

        let configuration = &self.storage.configuration;
        if configuration.kind == ConfigurationKind::Static && configuration.document.is_none() {
            return Err(ConfigError::missing("storage.configuration.document"));
        }

        Ok(())
    }
}
