//! Error types for the DSC pull server.
//!
//! [`DscError`] is the error type shared by the collaborator traits, the
//! reconciliation engine and the protocol handlers. Each variant belongs to an
//! [`ErrorCategory`], which decides the HTTP status a handler answers with.
//!
//! | `ErrorCategory` | Status | Variants |
//! |---|---|---|
//! | `Validation` | 400 | `Validation`, `UnnamedClaims` |
//! | `NotFound` | 404 | `ConfigurationNotFound`, `ModuleNotFound`, `ReportNotFound` |
//! | `NotRegistered` | 400 | `AgentNotRegistered` |
//! | `Internal` | 500 | `RegistrationMismatch`, `Internal`, `Io`, `Json` |
//!
//! Agents that are not registered get a 400 rather than a 404 so that the
//! client re-registers.

use http::StatusCode;
use thiserror::Error;

/// Result type alias using [`DscError`].
pub type DscResult<T> = Result<T, DscError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed or unsupported client input.
    Validation,
    /// A configuration, module or report does not exist.
    NotFound,
    /// The agent has no registration on file.
    NotRegistered,
    /// Unexpected collaborator or server failure.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Validation | Self::NotRegistered => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for the pull server.
///
/// The not-found variants render exactly the text clients see in the body of
/// a 404, so their `Display` output is part of the wire contract.
///
/// # Example
///
/// ```
/// use dsc_core::{DscError, ErrorCategory};
///
/// let err = DscError::configuration_not_found("0b8f", "WebServer");
/// assert_eq!(err.to_string(), r#"dsc: configuration "WebServer" not found"#);
/// assert_eq!(err.category(), ErrorCategory::NotFound);
/// ```
#[derive(Error, Debug)]
pub enum DscError {
    /// No configuration with the requested name.
    #[error("dsc: configuration {name:?} not found")]
    ConfigurationNotFound {
        /// Agent that asked for it.
        agent_id: String,
        /// Requested configuration name, as the client spelled it.
        name: String,
    },

    /// No module with the requested name and version.
    #[error("dsc: module {name:?} (version: {version:?}) not found")]
    ModuleNotFound {
        /// Agent that asked for it.
        agent_id: String,
        /// Requested module name.
        name: String,
        /// Requested module version (may be empty).
        version: String,
    },

    /// No stored report for the agent and job.
    #[error("dsc: job {job_id:?} for agent {agent_id:?} not found")]
    ReportNotFound {
        /// Agent the report belongs to.
        agent_id: String,
        /// Job identifier of the report.
        job_id: String,
    },

    /// The agent never registered with the node-status store.
    #[error("dsc: agent {agent_id:?} not registered")]
    AgentNotRegistered {
        /// Agent identifier.
        agent_id: String,
    },

    /// Malformed client input.
    #[error("{message}")]
    Validation {
        /// Human-readable error message.
        message: String,
    },

    /// A single checksum claim arrived for an agent that registered a
    /// different number of configurations.
    #[error("have {registered} registered configurations but client is only requesting 1")]
    RegistrationMismatch {
        /// Number of registered configuration names.
        registered: usize,
    },

    /// Several claims arrived without configuration names.
    #[error("don't support multiple ({claims}) non-partial configurations")]
    UnnamedClaims {
        /// Number of claims in the request.
        claims: usize,
    },

    /// Internal server error.
    #[error("{message}")]
    Internal {
        /// Human-readable error message.
        message: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Filesystem failure inside a collaborator.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure inside a collaborator.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DscError {
    /// Creates a configuration-not-found error.
    #[must_use]
    pub fn configuration_not_found(agent_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::ConfigurationNotFound {
            agent_id: agent_id.into(),
            name: name.into(),
        }
    }

    /// Creates a module-not-found error.
    #[must_use]
    pub fn module_not_found(
        agent_id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self::ModuleNotFound {
            agent_id: agent_id.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Creates a report-not-found error.
    #[must_use]
    pub fn report_not_found(agent_id: impl Into<String>, job_id: impl Into<String>) -> Self {
        Self::ReportNotFound {
            agent_id: agent_id.into(),
            job_id: job_id.into(),
        }
    }

    /// Creates an agent-not-registered error.
    #[must_use]
    pub fn agent_not_registered(agent_id: impl Into<String>) -> Self {
        Self::AgentNotRegistered {
            agent_id: agent_id.into(),
        }
    }

    /// Creates a validation error with a message.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an internal error with a source error.
    pub fn internal_with_source(
        message: impl Into<String>,
        source: impl Into<anyhow::Error>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigurationNotFound { .. }
            | Self::ModuleNotFound { .. }
            | Self::ReportNotFound { .. } => ErrorCategory::NotFound,
            Self::AgentNotRegistered { .. } => ErrorCategory::NotRegistered,
            Self::Validation { .. } | Self::UnnamedClaims { .. } => ErrorCategory::Validation,
            Self::RegistrationMismatch { .. }
            | Self::Internal { .. }
            | Self::Io(_)
            | Self::Json(_) => ErrorCategory::Internal,
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns true for the typed not-found conditions.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.category(), ErrorCategory::NotFound)
    }
}
