//! Destinations for finished reports.

use crate::orchestrator::FacetReport;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives each finished report once the whole run has succeeded.
pub trait ReportSink {
    fn write_report(&mut self, report: &FacetReport) -> Result<()>;

    /// Called after the last report
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when writing failed part way; undo whatever was written.
    fn abort(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one `Top{N}_{name}.csv` per report into a directory.
///
/// Each file has a `Title,AverageRating` header and one row per movie, with
/// the average formatted to two decimals. Titles containing commas or
/// quotes are quoted.
pub struct CsvSink {
    dir: PathBuf,
    top_n: usize,
    written: Vec<PathBuf>,
}

impl CsvSink {
    /// Sink writing into `dir`, which must already exist.
    pub fn new(dir: impl Into<PathBuf>, top_n: usize) -> Self {
        Self {
            dir: dir.into(),
            top_n,
            written: Vec::new(),
        }
    }

    /// Remove `dir` if present and recreate it empty, so a run never mixes
    /// its files with those of an earlier run.
    pub fn create_fresh(dir: impl Into<PathBuf>, top_n: usize) -> Result<Self> {
        let dir = dir.into();
        if dir.exists() {
            fs::remove_dir_all(&dir)
                .with_context(|| format!("Failed to clear {}", dir.display()))?;
        }
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        Ok(Self::new(dir, top_n))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in write order
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn file_name(&self, report: &FacetReport) -> String {
        format!("Top{}_{}.csv", self.top_n, report.name)
    }
}

impl ReportSink for CsvSink {
    fn write_report(&mut self, report: &FacetReport) -> Result<()> {
        let path = self.dir.join(self.file_name(report));

        let mut writer = csv::Writer::from_path(&path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        writer.write_record(["Title", "AverageRating"])?;
        for row in &report.rows {
            writer.write_record([row.title.as_str(), row.formatted_score().as_str()])?;
        }
        writer
            .flush()
            .with_context(|| format!("Failed to flush {}", path.display()))?;

        debug!("Wrote {} rows to {}", report.rows.len(), path.display());
        self.written.push(path);
        Ok(())
    }

    fn abort(&mut self) -> Result<()> {
        for path in self.written.drain(..) {
            if path.exists() {
                fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove {}", path.display()))?;
            }
        }
        Ok(())
    }
}
