//! Report generation for the top-rated movie engine.
//!
//! This crate turns a loaded `DataIndex` into the configured set of ranked
//! reports and hands them to a sink:
//! - `config`: what to report on and how to schedule it
//! - `orchestrator`: runs every report sequentially or on a worker pool
//! - `sink`: where finished reports go (CSV files by default)

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod sink;

pub use config::{
    AgeBand, CombinedReport, ExecutionMode, ReportConfig, ReportDefinition, DEFAULT_TOP_N,
};
pub use error::ReportError;
pub use orchestrator::{first_difference, FacetReport, ReportOrchestrator, ReportRow};
pub use sink::{CsvSink, ReportSink};
