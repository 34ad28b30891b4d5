//! Aggregation and ranking engine for top-rated movie reports.
//!
//! This crate provides:
//! - Filter trait and one implementation per facet kind
//! - FilterPipeline for composing filters
//! - Partitioning and order-preserving merging of the rating stream
//! - Per-movie aggregation and a deterministic top-N selection
//!
//! ## Architecture
//! A report is computed in stages:
//! 1. Filters select the ratings belonging to a facet
//! 2. `aggregate` groups them by movie (count and mean)
//! 3. `select_top` ranks the groups and keeps the first N
//!
//! `aggregate_chunks` is a library helper for callers that want to aggregate
//! chunks in parallel and fold the partials themselves. Report runs do not use
//! it: they aggregate the merged stream so averages match sequential runs bit
//! for bit.
//!
//! ## Example Usage
//! ```ignore
//! use pipeline::{aggregate, select_top, Facet, FilterPipeline};
//!
//! let filters = FilterPipeline::from_facets(&index, &[Facet::ByGender(Gender::Female)]);
//! let selected = filters.apply(index.ratings())?;
//! let top10 = select_top(&aggregate(&selected), 10);
//! ```

pub mod error;
pub mod traits;
pub mod facet;
pub mod filters;
pub mod filter_pipeline;
pub mod partition;
pub mod aggregate;
pub mod top_n;

// Re-export main types
pub use error::{EngineError, Result};
pub use traits::Filter;
pub use facet::Facet;
pub use filter_pipeline::FilterPipeline;
pub use partition::{
    merge, partition, partition_and_merge_parallel, Chunk, OwnedChunk, DEFAULT_CHUNK_SIZE,
};
pub use aggregate::{aggregate, aggregate_chunks, MovieStats};
pub use top_n::{compare_ranked, select_top, RankedMovie};
