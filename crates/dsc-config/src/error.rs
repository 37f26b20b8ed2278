//! Errors raised while loading or validating the server configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration failure.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file named explicitly does not exist.
    #[error("no configuration at {}", path.display())]
    NotFound {
        /// Path that was requested.
        path: PathBuf,
    },

    /// A configuration or `.env` file exists but could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// File that failed.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// Malformed TOML.
    #[error("bad TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON.
    #[error("bad JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// A setting is present but unusable.
    #[error("{field}: {reason}")]
    Invalid {
        /// Dotted path of the setting, e.g. `server.http_addr`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A setting the selected backend depends on is absent.
    #[error("{field} is required")]
    Missing {
        /// Dotted path of the setting.
        field: String,
    },

    /// An environment override could not be applied.
    #[error("{var}: {reason}")]
    Env {
        /// Variable name.
        var: String,
        /// What is wrong with its value.
        reason: String,
    },

    /// Neither TOML nor JSON.
    #[error("unsupported configuration format: {0}")]
    UnsupportedFormat(String),
}

impl ConfigError {
    pub(crate) fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }

    pub(crate) fn env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Env {
            var: var.into(),
            reason: reason.into(),
        }
    }
}
