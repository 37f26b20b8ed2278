//! Structured logging for the DSC pull server.
//!
//! Every crate in the workspace logs through `tracing`; this crate owns the
//! subscriber. Output is either one JSON object per line (the default) or a
//! human-readable layout for development.
//!
//! # Example
//!
//! ```rust,ignore
//! use dsc_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(agent_id = "B1F28971-2CEB-46D5-9DCB-79C044395F81", "agent registered");
//! ```

#![doc(html_root_url = "https://docs.rs/dsc-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
