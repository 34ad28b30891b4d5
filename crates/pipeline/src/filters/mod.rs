//! Filter implementations, one per facet kind.
//!
//! Each filter precomputes its qualifying id set when built and can be
//! composed into a FilterPipeline.

pub mod age_range;
pub mod category;
pub mod gender;
pub mod general;

// Re-export for convenience
pub use age_range::AgeRangeFilter;
pub use category::CategoryFilter;
pub use gender::GenderFilter;
pub use general::GeneralFilter;
