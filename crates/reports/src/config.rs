//! Report run configuration.
//!
//! Everything the orchestrator needs besides the data: execution mode,
//! chunking, N, worker count and the list of facets to report on. All
//! fields have defaults, so a JSON file only needs the values it changes:
//!
//! ```json
//! { "mode": "parallel", "categories": ["Action", "Sci-Fi"], "top_n": 5 }
//! ```

use crate::error::ReportError;
use data_loader::{Gender, Genre};
use pipeline::{DEFAULT_CHUNK_SIZE, Facet, Filter};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

/// Default number of movies per report
pub const DEFAULT_TOP_N: usize = 10;

/// How the facet pipelines are scheduled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One facet after another on the calling thread, over the stream as loaded
    #[default]
    Sequential,
    /// Partition and re-merge the stream, then run facets on the worker pool
    Parallel,
}

impl ExecutionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Sequential => "sequential",
            ExecutionMode::Parallel => "parallel",
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sequential" | "seq" | "single" => Ok(ExecutionMode::Sequential),
            "parallel" | "par" | "multi" => Ok(ExecutionMode::Parallel),
            other => Err(format!(
                "unknown execution mode '{}' (expected 'sequential' or 'parallel')",
                other
            )),
        }
    }
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, inclusive age range. `max == None` leaves it open above.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeBand {
    pub name: String,
    pub min: u32,
    #[serde(default)]
    pub max: Option<u32>,
}

impl AgeBand {
    pub fn new(name: impl Into<String>, min: u32, max: Option<u32>) -> Self {
        Self {
            name: name.into(),
            min,
            max,
        }
    }
}

/// A report whose facets are all applied together.
///
/// Unset criteria are ignored; a combined report with no criteria is a
/// second general report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombinedReport {
    pub name: String,
    pub gender: Option<Gender>,
    pub category: Option<String>,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
}

/// Configuration of one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    pub mode: ExecutionMode,
    /// Ratings per chunk when partitioning in parallel mode
    pub chunk_size: usize,
    /// Movies kept per report
    pub top_n: usize,
    /// Worker pool size; `None` uses the number of available CPUs
    pub workers: Option<usize>,
    /// Whether to emit the unfiltered report
    pub include_general: bool,
    pub genders: Vec<Gender>,
    /// Genre labels as they appear in the dataset ("Action", "Sci-Fi", ...)
    pub categories: Vec<String>,
    pub age_bands: Vec<AgeBand>,
    pub combined: Vec<CombinedReport>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Sequential,
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_n: DEFAULT_TOP_N,
            workers: None,
            include_general: true,
            genders: vec![Gender::Male, Gender::Female],
            categories: ["Action", "Drama", "Comedy", "Fantasy"]
                .into_iter()
                .map(String::from)
                .collect(),
            age_bands: vec![
                AgeBand::new("Under18", 0, Some(17)),
                AgeBand::new("18to30", 18, Some(30)),
                AgeBand::new("Above30", 31, None),
            ],
            combined: Vec::new(),
        }
    }
}

/// One named report: the facets that select its ratings.
///
/// `extra_filters` are applied after the facets; they let callers plug in
/// filters that have no facet descriptor.
#[derive(Clone)]
pub struct ReportDefinition {
    pub name: String,
    pub facets: Vec<Facet>,
    pub extra_filters: Vec<Arc<dyn Filter>>,
}

impl ReportDefinition {
    pub fn new(name: impl Into<String>, facets: Vec<Facet>) -> Self {
        Self {
            name: name.into(),
            facets,
            extra_filters: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.extra_filters.push(filter);
        self
    }
}

impl fmt::Debug for ReportDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportDefinition")
            .field("name", &self.name)
            .field("facets", &self.facets)
            .field(
                "extra_filters",
                &self.extra_filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl ReportConfig {
    /// Load a config from a JSON file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, ReportError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ReportError::InvalidConfiguration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&raw).map_err(|e| match e {
            ReportError::InvalidConfiguration(msg) => {
                ReportError::InvalidConfiguration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ReportError> {
        serde_json::from_str(raw).map_err(|e| ReportError::InvalidConfiguration(e.to_string()))
    }

    /// Number of worker threads for parallel mode
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        })
    }

    /// Check the scalar settings: chunk size, N and worker count.
    pub fn validate(&self) -> Result<(), ReportError> {
        if self.chunk_size == 0 {
            return Err(ReportError::InvalidConfiguration(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if self.top_n == 0 {
            return Err(ReportError::InvalidConfiguration(
                "top_n must be at least 1".to_string(),
            ));
        }
        if self.workers == Some(0) {
            return Err(ReportError::InvalidConfiguration(
                "workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Expand the facet settings into named reports, in output order:
    /// general, genders, categories, age bands, combined reports.
    pub fn report_definitions(&self) -> Result<Vec<ReportDefinition>, ReportError> {
        let mut definitions = Vec::new();

        if self.include_general {
            definitions.push(ReportDefinition::new("General", vec![Facet::General]));
        }

        for gender in &self.genders {
            definitions.push(ReportDefinition::new(
                gender.label(),
                vec![Facet::ByGender(*gender)],
            ));
        }

        for label in &self.categories {
            let genre = parse_genre(label)?;
            definitions.push(ReportDefinition::new(
                file_safe_name(genre.label()),
                vec![Facet::ByCategory(genre)],
            ));
        }

        for band in &self.age_bands {
            check_age_range(&band.name, band.min, band.max)?;
            definitions.push(ReportDefinition::new(
                band.name.clone(),
                vec![Facet::ByAgeRange {
                    min: band.min,
                    max: band.max,
                }],
            ));
        }

        for combined in &self.combined {
            definitions.push(combined.to_definition()?);
        }

        check_definitions(&definitions)?;
        Ok(definitions)
    }
}

impl CombinedReport {
    fn to_definition(&self) -> Result<ReportDefinition, ReportError> {
        let mut facets = Vec::new();

        if let Some(gender) = self.gender {
            facets.push(Facet::ByGender(gender));
        }
        if let Some(label) = &self.category {
            facets.push(Facet::ByCategory(parse_genre(label)?));
        }
        if self.min_age.is_some() || self.max_age.is_some() {
            let min = self.min_age.unwrap_or(0);
            check_age_range(&self.name, min, self.max_age)?;
            facets.push(Facet::ByAgeRange {
                min,
                max: self.max_age,
            });
        }
        if facets.is_empty() {
            facets.push(Facet::General);
        }

        Ok(ReportDefinition::new(self.name.clone(), facets))
    }
}

/// Reject empty lists, and names that are blank, duplicated or not usable
/// inside an output file name.
pub(crate) fn check_definitions(definitions: &[ReportDefinition]) -> Result<(), ReportError> {
    if definitions.is_empty() {
        return Err(ReportError::InvalidConfiguration(
            "no reports configured".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for definition in definitions {
        if definition.name.trim().is_empty() {
            return Err(ReportError::InvalidConfiguration(
                "report names must not be empty".to_string(),
            ));
        }
        if definition
            .name
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':') || c.is_control())
        {
            return Err(ReportError::InvalidConfiguration(format!(
                "report name '{}' cannot be used as a file name",
                definition.name
            )));
        }
        if !seen.insert(definition.name.as_str()) {
            return Err(ReportError::InvalidConfiguration(format!(
                "duplicate report name '{}'",
                definition.name
            )));
        }
    }
    Ok(())
}

fn parse_genre(label: &str) -> Result<Genre, ReportError> {
    label
        .parse()
        .map_err(ReportError::InvalidConfiguration)
}

fn check_age_range(name: &str, min: u32, max: Option<u32>) -> Result<(), ReportError> {
    match max {
        Some(max) if max < min => Err(ReportError::InvalidConfiguration(format!(
            "age band '{}' has min {} above max {}",
            name, min, max
        ))),
        _ => Ok(()),
    }
}

/// "Children's" -> "Childrens"; keeps letters, digits and dashes.
fn file_safe_name(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(definitions: &[ReportDefinition]) -> Vec<&str> {
        definitions.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_default_reports() {
        let config = ReportConfig::default();
        config.validate().unwrap();

        let definitions = config.report_definitions().unwrap();
        assert_eq!(
            names(&definitions),
            vec![
                "General", "Male", "Female", "Action", "Drama", "Comedy", "Fantasy", "Under18",
                "18to30", "Above30"
            ]
        );
        assert_eq!(
            definitions[9].facets,
            vec![Facet::ByAgeRange { min: 31, max: None }]
        );
        assert_eq!(config.chunk_size, 10_000);
        assert_eq!(config.top_n, 10);
    }

    #[test]
    fn test_invalid_scalars() {
        for config in [
            ReportConfig { chunk_size: 0, ..Default::default() },
            ReportConfig { top_n: 0, ..Default::default() },
            ReportConfig { workers: Some(0), ..Default::default() },
        ] {
            assert!(matches!(
                config.validate(),
                Err(ReportError::InvalidConfiguration(_))
            ));
        }
    }

    #[test]
    fn test_empty_facet_list_is_rejected() {
        let config = ReportConfig {
            include_general: false,
            genders: vec![],
            categories: vec![],
            age_bands: vec![],
            ..Default::default()
        };

        let err = config.report_definitions().unwrap_err();
        assert!(err.to_string().contains("no reports"));
    }

    #[test]
    fn test_bad_facets_are_rejected() {
        let unknown_genre = ReportConfig {
            categories: vec!["Cartoon".to_string()],
            ..Default::default()
        };
        assert!(unknown_genre.report_definitions().is_err());

        let inverted = ReportConfig {
            age_bands: vec![AgeBand::new("Odd", 40, Some(20))],
            ..Default::default()
        };
        assert!(inverted.report_definitions().is_err());

        let duplicate = ReportConfig {
            categories: vec!["Drama".to_string(), "drama".to_string()],
            ..Default::default()
        };
        let err = duplicate.report_definitions().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_names_with_path_separators_are_rejected() {
        for name in ["../x", "a/b", "c:\\d", "tab\there"] {
            let band = ReportConfig {
                age_bands: vec![AgeBand::new(name, 18, Some(30))],
                ..Default::default()
            };
            let err = band.report_definitions().unwrap_err();
            assert!(err.to_string().contains("file name"), "{}: {}", name, err);

            let combined = ReportConfig {
                combined: vec![CombinedReport {
                    name: name.to_string(),
                    gender: Some(Gender::Female),
                    ..Default::default()
                }],
                ..Default::default()
            };
            assert!(combined.report_definitions().is_err(), "{}", name);
        }

        let dotted = ReportConfig {
            age_bands: vec![AgeBand::new("Age.18-30", 18, Some(30))],
            ..Default::default()
        };
        assert!(dotted.report_definitions().is_ok());
    }

    #[test]
    fn test_json_overrides_keep_defaults() {
        let config = ReportConfig::from_json_str(
            r#"{
                "mode": "parallel",
                "top_n": 5,
                "genders": ["F"],
                "categories": ["Sci-Fi", "Children's"],
                "combined": [{ "name": "WomenDrama", "gender": "F", "category": "Drama" }]
            }"#,
        )
        .unwrap();

        assert_eq!(config.mode, ExecutionMode::Parallel);
        assert_eq!(config.top_n, 5);
        assert_eq!(config.chunk_size, DEFAULT_CHUNK_SIZE);

        let definitions = config.report_definitions().unwrap();
        assert_eq!(
            names(&definitions),
            vec![
                "General", "Female", "Sci-Fi", "Childrens", "Under18", "18to30", "Above30",
                "WomenDrama"
            ]
        );
        assert_eq!(
            definitions[7].facets,
            vec![Facet::ByGender(Gender::Female), Facet::ByCategory(Genre::Drama)]
        );
    }

    #[test]
    fn test_json_rejects_unknown_fields() {
        let err = ReportConfig::from_json_str(r#"{ "chunksize": 5 }"#).unwrap_err();
        assert!(matches!(err, ReportError::InvalidConfiguration(_)));
    }

    #[test]
    fn test_execution_mode_parsing() {
        assert_eq!("parallel".parse::<ExecutionMode>().unwrap(), ExecutionMode::Parallel);
        assert_eq!("Sequential".parse::<ExecutionMode>().unwrap(), ExecutionMode::Sequential);
        assert!("fast".parse::<ExecutionMode>().is_err());
        assert_eq!(ExecutionMode::Parallel.to_string(), "parallel");
    }
}
