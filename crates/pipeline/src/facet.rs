//! Facet descriptors and how they turn into filters.

use crate::filters::{AgeRangeFilter, CategoryFilter, GenderFilter, GeneralFilter};
use crate::traits::Filter;
use data_loader::{DataIndex, Gender, Genre};
use std::fmt;

/// One slicing criterion for a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    /// Every rating, including those with dangling ids
    General,
    /// Ratings by users of this gender
    ByGender(Gender),
    /// Ratings of movies tagged with this genre
    ByCategory(Genre),
    /// Ratings by users aged `min..=max`; `max == None` is unbounded
    ByAgeRange { min: u32, max: Option<u32> },
}

impl Facet {
    /// Build the filter for this facet.
    ///
    /// Id-dependent facets scan the user or movie table once here; the
    /// returned filter then answers each rating in O(1).
    pub fn build_filter(&self, data_index: &DataIndex) -> Box<dyn Filter> {
        match *self {
            Facet::General => Box::new(GeneralFilter),
            Facet::ByGender(gender) => Box::new(GenderFilter::new(data_index, gender)),
            Facet::ByCategory(genre) => Box::new(CategoryFilter::new(data_index, genre)),
            Facet::ByAgeRange { min, max } => Box::new(AgeRangeFilter::new(data_index, min, max)),
        }
    }
}

impl fmt::Display for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facet::General => write!(f, "general"),
            Facet::ByGender(gender) => write!(f, "gender={}", gender.code()),
            Facet::ByCategory(genre) => write!(f, "category={}", genre),
            Facet::ByAgeRange { min, max: Some(max) } => write!(f, "age={}..={}", min, max),
            Facet::ByAgeRange { min, max: None } => write!(f, "age={}..", min),
        }
    }
}
