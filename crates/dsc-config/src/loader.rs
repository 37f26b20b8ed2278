//! Layered configuration loader.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{ConfigurationKind, StoreKind};
use crate::{ConfigError, PullServerConfig};
use dsc_telemetry::LogFormat;

/// Builds a [`PullServerConfig`] from defaults, files and the environment.
///
/// Environment variables use the format `PREFIX_SECTION__KEY`, for example
/// `DSC_SERVER__HTTP_ADDR=0.0.0.0:9000` or `DSC_STORAGE__REPORTS__KIND=memory`.
#[derive(Debug)]
pub struct ConfigLoader {
    config: PullServerConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a loader seeded with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: PullServerConfig::default(),
            env_prefix: None,
        }
    }

    /// Starts over from the development preset.
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = PullServerConfig::development();
        self
    }

    /// Loads a TOML or JSON file, chosen by extension.
    ///
    /// Keys the file does not name take their defaults.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::not_found(path));
        }

        let content =
            fs::read_to_string(path).map_err(|e| ConfigError::read(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Loads a file if it exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Loads configuration from a string in `format` ("toml" or "json").
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::UnsupportedFormat(format.to_string())),
        };
        Ok(self)
    }

    /// Sets the environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Loads variables from a `.env` file, if there is one.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(dotenvy::Error::Io(source)) => Err(ConfigError::read(".env", source)),
            Err(e) => Err(ConfigError::env(".env", e.to_string())),
        }
    }

    /// Applies environment overrides, validates, and returns the result.
    pub fn load(self) -> Result<PullServerConfig, ConfigError> {
        let config = self.load_unvalidated()?;
        config.validate()?;
        Ok(config)
    }

    /// Applies environment overrides without validating, for callers that
    /// layer further overrides on top.
    pub fn load_unvalidated(mut self) -> Result<PullServerConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            let vars: Vec<(String, String)> = env::vars()
                .filter(|(key, _)| key.starts_with(&prefix))
                .collect();
            for (key, value) in vars {
                self.apply_env_var(&key, &value, &prefix)?;
            }
        }
        Ok(self.config)
    }

    fn parse_file(content: &str, path: &Path) -> Result<PullServerConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(rest) = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix('_'))
        else {
            return Ok(());
        };
        let parts: Vec<&str> = rest.split("__").collect();
        let config = &mut self.config;

        match parts.as_slice() {
            ["SERVER", "HTTP_ADDR"] => config.server.http_addr = value.to_string(),
            ["SERVER", "MAX_BODY_BYTES"] => {
                config.server.max_body_bytes = parse_int(key, value)?;
            }
            ["SERVER", "SHUTDOWN_TIMEOUT_SECS"] => {
                config.server.shutdown_timeout_secs = parse_int(key, value)?;
            }
            ["SERVER", "REQUEST_TIMEOUT_MS"] => {
                config.server.request_timeout_ms = parse_int(key, value)?;
            }

            ["AUTH", "KEYS"] => {
                config.auth.keys = value
                    .split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(ToString::to_string)
                    .collect();
            }

            ["LOGGING", "ENABLED"] => {
                config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => config.logging.level = value.to_string(),
            ["LOGGING", "FORMAT"] => {
                config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }

            ["STORAGE", "CONFIGURATION", "KIND"] => {
                config.storage.configuration.kind = match value.to_lowercase().as_str() {
                    "local" => ConfigurationKind::Local,
                    "static" => ConfigurationKind::Static,
                    _ => {
                        return Err(ConfigError::env(
                            key,
                            "expected 'local' or 'static'",
                        ))
                    }
                };
            }
            ["STORAGE", "CONFIGURATION", "ROOT"] => {
                config.storage.configuration.root = PathBuf::from(value);
            }
            ["STORAGE", "CONFIGURATION", "DOCUMENT"] => {
                config.storage.configuration.document =
                    (!value.is_empty()).then(|| PathBuf::from(value));
            }
            ["STORAGE", "REPORTS", "KIND"] => {
                config.storage.reports.kind = parse_store_kind(key, value)?;
            }
            ["STORAGE", "REPORTS", "ROOT"] => {
                config.storage.reports.root = PathBuf::from(value);
            }
            ["STORAGE", "STATUS", "KIND"] => {
                config.storage.status.kind = parse_store_kind(key, value)?;
            }
            ["STORAGE", "STATUS", "PATH"] => {
                config.storage.status.path = PathBuf::from(value);
            }

            _ => {}
        }

        Ok(())
    }
}

fn parse_int(key: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse()
        .map_err(|_| ConfigError::env(key, "expected integer"))
}

fn parse_store_kind(key: &str, value: &str) -> Result<StoreKind, ConfigError> {
    match value.to_lowercase().as_str() {
        "local" => Ok(StoreKind::Local),
        "memory" => Ok(StoreKind::Memory),
        _ => Err(ConfigError::env(key, "expected 'local' or 'memory'")),
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
