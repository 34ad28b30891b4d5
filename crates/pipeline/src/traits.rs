//! Core traits for facet filtering.

use anyhow::Result;
use data_loader::Rating;
use std::sync::Arc;

/// A predicate deciding whether a rating belongs to a facet.
///
/// ## Design Note
/// - `Send + Sync` lets one filter be shared by every worker of a run
/// - `matches` must be O(1): implementations precompute whatever id sets
///   they need when they are built, never while scanning ratings
pub trait Filter: Send + Sync {
    /// Returns the name of this filter (for logging/debugging)
    fn name(&self) -> &str;

    /// Whether `rating` passes this filter.
    fn matches(&self, rating: &Rating) -> bool;

    /// Keep the ratings that pass this filter, preserving their order.
    ///
    /// The default never fails; implementations backed by fallible lookups
    /// may override it and report errors.
    fn apply(&self, ratings: &[Rating]) -> Result<Vec<Rating>> {
        Ok(ratings
            .iter()
            .filter(|rating| self.matches(rating))
            .copied()
            .collect())
    }
}

/// Shared filters can be added to several pipelines at once.
impl<F: Filter + ?Sized> Filter for Arc<F> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn matches(&self, rating: &Rating) -> bool {
        (**self).matches(rating)
    }

    fn apply(&self, ratings: &[Rating]) -> Result<Vec<Rating>> {
        (**self).apply(ratings)
    }
}
