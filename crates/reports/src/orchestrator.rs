//! # Report Orchestrator
//!
//! Coordinates a whole report run:
//! 1. Validate the configuration (before any work is dispatched)
//! 2. Parallel mode only: partition the rating stream and re-merge it
//! 3. For every report: filter -> aggregate -> select top N
//! 4. Resolve titles into typed rows
//! 5. Hand finished reports to a sink, only if every report succeeded
//!
//! Sequential and parallel runs produce identical reports: each report is
//! computed from the same rating sequence in the same order, and no report
//! observes another.

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use data_loader::{DataIndex, MovieId, Rating};
use pipeline::{aggregate, partition_and_merge_parallel, select_top, Facet, FilterPipeline};

use crate::config::{check_definitions, ExecutionMode, ReportConfig, ReportDefinition};
use crate::error::ReportError;
use crate::sink::ReportSink;

/// One ranked line of a report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub movie_id: MovieId,
    pub title: String,
    pub avg_rating: f64,
    pub rating_count: u32,
}

impl ReportRow {
    /// The average as written to output files, e.g. "4.00"
    pub fn formatted_score(&self) -> String {
        format!("{:.2}", self.avg_rating)
    }
}

/// The ranked list for one report.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetReport {
    pub name: String,
    pub facets: Vec<Facet>,
    pub rows: Vec<ReportRow>,
}

/// Drives every configured report through the engine.
#[derive(Clone)]
pub struct ReportOrchestrator {
    data_index: Arc<DataIndex>,
    config: ReportConfig,
    definitions: Arc<Vec<ReportDefinition>>,
    pool: Arc<rayon::ThreadPool>,
}

impl ReportOrchestrator {
    /// Create an orchestrator for the reports described by `config`.
    ///
    /// Fails with `InvalidConfiguration` on a zero chunk size, zero N, zero
    /// workers, an empty report list or a malformed facet.
    pub fn new(data_index: Arc<DataIndex>, config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        let definitions = config.report_definitions()?;
        Self::with_definitions(data_index, config, definitions)
    }

    /// Create an orchestrator for an explicit list of reports.
    pub fn with_definitions(
        data_index: Arc<DataIndex>,
        config: ReportConfig,
        definitions: Vec<ReportDefinition>,
    ) -> Result<Self, ReportError> {
        config.validate()?;
        check_definitions(&definitions)?;

        let workers = config.worker_count();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("report-worker-{}", i))
            .build()?;

        info!(
            "Report orchestrator ready: {} reports, top {}, {} workers",
            definitions.len(),
            config.top_n,
            workers
        );

        Ok(Self {
            data_index,
            config,
            definitions: Arc::new(definitions),
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn definitions(&self) -> &[ReportDefinition] {
        &self.definitions
    }

    /// Compute every report in the given mode.
    ///
    /// Reports come back in configuration order regardless of mode. On
    /// failure nothing is returned but the error of the first failing
    /// report, after all workers have stopped.
    pub fn generate(&self, mode: ExecutionMode) -> Result<Vec<FacetReport>, ReportError> {
        let start_time = Instant::now();
        info!("Generating {} reports ({} mode)", self.definitions.len(), mode);

        let reports = match mode {
            ExecutionMode::Sequential => self.generate_sequential()?,
            ExecutionMode::Parallel => self.generate_parallel()?,
        };

        info!(
            "Execution time ({} mode): {:.2}s",
            mode,
            start_time.elapsed().as_secs_f64()
        );
        Ok(reports)
    }

    /// Generate in the configured mode.
    pub fn generate_configured(&self) -> Result<Vec<FacetReport>, ReportError> {
        self.generate(self.config.mode)
    }

    /// Generate every report, then write them all to `sink`.
    ///
    /// The sink sees nothing unless the whole batch succeeded. If the sink
    /// itself fails part way, it is told to abort and drop what it wrote.
    pub fn run(
        &self,
        mode: ExecutionMode,
        sink: &mut dyn ReportSink,
    ) -> Result<Vec<FacetReport>, ReportError> {
        let reports = self.generate(mode)?;

        if let Err(err) = Self::write_all(&reports, sink) {
            if let Err(cleanup) = sink.abort() {
                warn!("Failed to remove partial output: {:#}", cleanup);
            }
            return Err(ReportError::Sink(err));
        }

        info!("Wrote {} reports", reports.len());
        Ok(reports)
    }

    fn write_all(reports: &[FacetReport], sink: &mut dyn ReportSink) -> anyhow::Result<()> {
        for report in reports {
            sink.write_report(report)?;
        }
        sink.finish()
    }

    /// Every report on the calling thread, over the stream as loaded
    fn generate_sequential(&self) -> Result<Vec<FacetReport>, ReportError> {
        let ratings = self.data_index.ratings();
        self.definitions
            .iter()
            .map(|definition| self.run_guarded(definition, ratings))
            .collect()
    }

    /// Partition + merge the stream on the pool, then one pool task per report
    fn generate_parallel(&self) -> Result<Vec<FacetReport>, ReportError> {
        let ratings = self.data_index.ratings();
        let chunk_size = self.config.chunk_size;

        let merged = self
            .pool
            .install(|| partition_and_merge_parallel(ratings, chunk_size))?;
        debug!("Merged {} ratings from chunks of {}", merged.len(), chunk_size);

        // Indexed collect: returns only once every task has finished, with
        // outcomes in definition order
        let outcomes: Vec<Result<FacetReport, ReportError>> = self.pool.install(|| {
            self.definitions
                .par_iter()
                .map(|definition| self.run_guarded(definition, &merged))
                .collect()
        });

        outcomes.into_iter().collect()
    }

    /// Run one report, turning a panic into a `WorkerFailure`.
    fn run_guarded(
        &self,
        definition: &ReportDefinition,
        ratings: &[Rating],
    ) -> Result<FacetReport, ReportError> {
        panic::catch_unwind(AssertUnwindSafe(|| self.run_definition(definition, ratings)))
            .unwrap_or_else(|payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                Err(ReportError::WorkerFailure {
                    facet: definition.name.clone(),
                    source: anyhow!("worker panicked: {}", message),
                })
            })
    }

    /// filter -> aggregate -> select -> resolve titles, for one report
    #[instrument(skip(self, definition, ratings), fields(report = %definition.name))]
    fn run_definition(
        &self,
        definition: &ReportDefinition,
        ratings: &[Rating],
    ) -> Result<FacetReport, ReportError> {
        let filters = definition.extra_filters.iter().fold(
            FilterPipeline::from_facets(&self.data_index, &definition.facets),
            |pipeline, filter| pipeline.add_filter(Arc::clone(filter)),
        );

        let selected = filters
            .apply(ratings)
            .map_err(|source| ReportError::WorkerFailure {
                facet: definition.name.clone(),
                source,
            })?;

        let stats = aggregate(&selected);
        let ranked = select_top(&stats, self.config.top_n);
        debug!(
            "Selected {} of {} movies from {} ratings",
            ranked.len(),
            stats.len(),
            selected.len()
        );

        let rows = ranked
            .into_iter()
            .map(|ranked| ReportRow {
                movie_id: ranked.movie_id,
                title: self.data_index.title_for(ranked.movie_id),
                avg_rating: ranked.avg_rating,
                rating_count: ranked.rating_count,
            })
            .collect();

        Ok(FacetReport {
            name: definition.name.clone(),
            facets: definition.facets.clone(),
            rows,
        })
    }
}

/// Describe the first difference between two report sets, if any.
pub fn first_difference(left: &[FacetReport], right: &[FacetReport]) -> Option<String> {
    if left.len() != right.len() {
        return Some(format!(
            "report count differs: {} vs {}",
            left.len(),
            right.len()
        ));
    }

    for (a, b) in left.iter().zip(right) {
        if a.name != b.name {
            return Some(format!("report order differs: '{}' vs '{}'", a.name, b.name));
        }
        if a.rows.len() != b.rows.len() {
            return Some(format!(
                "report '{}' has {} vs {} rows",
                a.name,
                a.rows.len(),
                b.rows.len()
            ));
        }
        for (rank, (x, y)) in a.rows.iter().zip(&b.rows).enumerate() {
            if x != y {
                return Some(format!(
                    "report '{}' rank {}: '{}' {} vs '{}' {}",
                    a.name,
                    rank + 1,
                    x.title,
                    x.formatted_score(),
                    y.title,
                    y.formatted_score()
                ));
            }
        }
    }
    None
}
