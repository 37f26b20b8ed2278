//! Server error types.

use std::net::{AddrParseError, SocketAddr};
use thiserror::Error;

/// Errors raised while building or running the server.
///
/// Request-level failures never surface here; they are answered with an
/// HTTP status by the handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// The configured listen address does not parse.
    #[error("invalid address {addr:?}: {source}")]
    InvalidAddress {
        /// Address as configured.
        addr: String,
        /// Parse failure.
        #[source]
        source: AddrParseError,
    },

    /// Failed to bind the listener.
    #[error("failed to bind to {addr}: {source}")]
    Bind {
        /// Address we tried to bind.
        addr: SocketAddr,
        /// Underlying socket error.
        #[source]
        source: std::io::Error,
    },

    /// A route grammar failed to compile.
    #[error(transparent)]
    Route(#[from] dsc_router::PatternError),

    /// An identifier expression failed to compile.
    #[error("invalid identifier expression: {0}")]
    Expression(#[from] regex::Error),

    /// I/O error while serving.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
