//! The FilterPipeline composes facet filters.
//!
//! A rating survives the pipeline only if every filter accepts it, so a
//! pipeline of a gender filter and a category filter selects e.g. "ratings
//! of dramas by women".

use crate::facet::Facet;
use crate::traits::Filter;
use anyhow::Result;
use data_loader::{DataIndex, Rating};

/// Chains multiple filters together by conjunction.
///
/// ## Usage
/// ```ignore
/// let pipeline = FilterPipeline::new()
///     .add_filter(GenderFilter::new(&index, Gender::Female))
///     .add_filter(CategoryFilter::new(&index, Genre::Drama));
///
/// let selected = pipeline.apply(index.ratings())?;
/// ```
pub struct FilterPipeline {
    filters: Vec<Box<dyn Filter>>,
}

impl FilterPipeline {
    /// Create a new empty FilterPipeline. It accepts every rating.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Build one filter per facet against the dataset.
    pub fn from_facets(data_index: &DataIndex, facets: &[Facet]) -> Self {
        facets.iter().fold(Self::new(), |pipeline, facet| {
            pipeline.add_boxed(facet.build_filter(data_index))
        })
    }

    /// Add a filter to the pipeline (builder pattern).
    pub fn add_filter(mut self, filter: impl Filter + 'static) -> Self {
        self.filters.push(Box::new(filter));
        self
    }

    /// Add an already boxed filter, as returned by [`Facet::build_filter`].
    pub fn add_boxed(mut self, filter: Box<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Names of the filters, in application order
    pub fn filter_names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    /// Whether a single rating passes every filter.
    pub fn matches(&self, rating: &Rating) -> bool {
        self.filters.iter().all(|filter| filter.matches(rating))
    }

    /// Apply all filters in sequence, preserving rating order.
    ///
    /// # Returns
    /// * `Ok(Vec<Rating>)` - The ratings accepted by every filter
    /// * `Err` - If any filter fails
    pub fn apply(&self, ratings: &[Rating]) -> Result<Vec<Rating>> {
        let Some((first, rest)) = self.filters.split_first() else {
            return Ok(ratings.to_vec());
        };

        let mut current = self.apply_one(first.as_ref(), ratings)?;
        for filter in rest {
            current = self.apply_one(filter.as_ref(), &current)?;
        }
        Ok(current)
    }

    fn apply_one(&self, filter: &dyn Filter, ratings: &[Rating]) -> Result<Vec<Rating>> {
        tracing::debug!(
            "Applying filter: {} (input count: {})",
            filter.name(),
            ratings.len()
        );
        let filtered = filter.apply(ratings)?;
        tracing::debug!(
            "Filter applied: {} (output count: {})",
            filter.name(),
            filtered.len()
        );
        Ok(filtered)
    }
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new()
    }
}
