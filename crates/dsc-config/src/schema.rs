//! Configuration schema types.
//!
//! Every section rejects unknown keys and fills missing keys with defaults,
//! so a file only has to name what it changes.

use dsc_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// HTTP listener settings.
///
/// # Example
///
/// ```
/// use dsc_config::ServerConfig;
///
/// let config = ServerConfig::default();
/// assert_eq!(config.http_addr, "127.0.0.1:8000");
/// assert_eq!(config.max_body_bytes, 1 << 20);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Bind address (e.g. "0.0.0.0:8000").
    #[serde(default = "default_http_addr")]
    pub http_addr: String,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: u64,

    /// Graceful shutdown timeout in seconds.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            max_body_bytes: default_max_body_bytes(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_body_bytes() -> u64 {
    1 << 20
}

fn default_shutdown_timeout() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30_000
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output layout.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl LoggingConfig {
    /// Converts to the subscriber settings.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ..LogConfig::default()
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Registration-key authentication.
///
/// With no keys, requests are not authenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    /// Accepted registration keys.
    #[serde(default)]
    pub keys: Vec<String>,
}

impl AuthConfig {
    /// Returns true if requests must be signed.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// Where configurations and modules come from.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigurationKind {
    /// Files under a root directory.
    #[default]
    Local,
    /// A single document served for every name.
    Static,
}

/// A module served by the static repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StaticModule {
    /// Module name.
    pub name: String,
    /// Module version, possibly empty.
    #[serde(default)]
    pub version: String,
    /// File holding the module archive.
    pub path: PathBuf,
}

/// Configuration repository settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ConfigurationStorage {
    /// Backend.
    #[serde(default)]
    pub kind: ConfigurationKind,

    /// Root directory of the local backend.
    #[serde(default = "default_configuration_root")]
    pub root: PathBuf,

    /// Document served by the static backend.
    #[serde(default)]
    pub document: Option<PathBuf>,

    /// Modules served by the static backend.
    #[serde(default)]
    pub modules: Vec<StaticModule>,
}

impl Default for ConfigurationStorage {
    fn default() -> Self {
        Self {
            kind: ConfigurationKind::default(),
            root: default_configuration_root(),
            document: None,
            modules: Vec::new(),
        }
    }
}

fn default_configuration_root() -> PathBuf {
    PathBuf::from("test/config")
}

/// Backend for reports and node status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// Files on disk.
    #[default]
    Local,
    /// Process memory; lost on restart.
    Memory,
}

/// Report server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ReportStorage {
    /// Backend.
    #[serde(default)]
    pub kind: StoreKind,

    /// Root directory of the local backend.
    #[serde(default = "default_reports_root")]
    pub root: PathBuf,
}

impl Default for ReportStorage {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            root: default_reports_root(),
        }
    }
}

fn default_reports_root() -> PathBuf {
    PathBuf::from("test/reports")
}

/// Node-status store settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StatusStorage {
    /// Backend.
    #[serde(default)]
    pub kind: StoreKind,

    /// Directory of the local backend. Must already exist.
    #[serde(default = "default_status_path")]
    pub path: PathBuf,
}

impl Default for StatusStorage {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            path: default_status_path(),
        }
    }
}

fn default_status_path() -> PathBuf {
    PathBuf::from("test/status")
}

/// Collaborator backends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Configuration repository.
    #[serde(default)]
    pub configuration: ConfigurationStorage,

    /// Report server.
    #[serde(default)]
    pub reports: ReportStorage,

    /// Node-status store.
    #[serde(default)]
    pub status: StatusStorage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.shutdown_timeout_secs, 30);
    }

    #[test]
    fn test_server_rejects_unknown_fields() {
        let result: Result<ServerConfig, _> = toml::from_str("http2_enabled = true");
        assert!(result.is_err());
    }

    #[test]
    fn test_logging_to_log_config() {
        let logging = LoggingConfig {
            enabled: true,
            level: "debug".to_string(),
            format: LogFormat::Pretty,
        };
        let log = logging.to_log_config();
        assert_eq!(log.level, "debug");
        assert_eq!(log.format, LogFormat::Pretty);
    }

    #[test]
    fn test_static_configuration_storage() {
        let toml = r#"
            kind = "static"
            document = "/srv/dsc/node.mof"

            [[modules]]
            name = "xWebAdministration"
            version = "1.17.0.0"
            path = "/srv/dsc/xWebAdministration.zip"
        "#;
        let storage: ConfigurationStorage = toml::from_str(toml).unwrap();
        assert_eq!(storage.kind, ConfigurationKind::Static);
        assert_eq!(storage.modules.len(), 1);
        assert_eq!(storage.modules[0].version, "1.17.0.0");
        assert_eq!(storage.root, PathBuf::from("test/config"));
    }

    #[test]
    fn test_store_kind_names() {
        let storage: ReportStorage = toml::from_str(r#"kind = "memory""#).unwrap();
        assert_eq!(storage.kind, StoreKind::Memory);
        assert!(toml::from_str::<ReportStorage>(r#"kind = "s3""#).is_err());
    }

    #[test]
    fn test_auth_enabled() {
        assert!(!AuthConfig::default().is_enabled());
        let auth = AuthConfig {
            keys: vec!["key".to_string()],
        };
        assert!(auth.is_enabled());
    }
}
