//! Pattern compilation errors.

use thiserror::Error;

/// A URL grammar failed to compile.
#[derive(Debug, Error)]
#[error("invalid route pattern {pattern:?}: {source}")]
pub struct PatternError {
    /// The full anchored expression that was compiled.
    pub pattern: String,
    /// Regex compiler error.
    #[source]
    pub source: regex::Error,
}
