//! Errors surfaced by a report run.

use pipeline::EngineError;
use thiserror::Error;

/// Why a report run failed.
///
/// Dangling references and empty facets are not errors; they simply
/// produce shorter reports.
#[derive(Error, Debug)]
pub enum ReportError {
    /// Rejected before any work was dispatched
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A facet pipeline failed or panicked on its worker
    #[error("Report '{facet}' failed: {source:#}")]
    WorkerFailure {
        facet: String,
        source: anyhow::Error,
    },

    /// Partitioning or merging the rating stream failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// The worker pool could not be started
    #[error("Failed to build worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// The sink rejected a finished report
    #[error("Failed to write reports: {0:#}")]
    Sink(anyhow::Error),
}

impl ReportError {
    /// Name of the failed report, for worker failures
    pub fn failed_facet(&self) -> Option<&str> {
        match self {
            ReportError::WorkerFailure { facet, .. } => Some(facet),
            _ => None,
        }
    }
}
