//! Error types for the aggregation engine.

use thiserror::Error;

/// Misuse of an engine operation.
///
/// Conditions the engine can absorb (empty facets, unknown ids) are never
/// reported through this type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// An argument is outside the accepted domain, e.g. a chunk size of zero
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, EngineError>;
