//! Splitting the rating stream into chunks and putting it back together.
//!
//! Chunks remember their position in the original stream. `merge` orders
//! by that position only, so the merged stream never depends on which
//! worker finished first.

use crate::error::{EngineError, Result};
use data_loader::Rating;
use rayon::prelude::*;
use tracing::debug;

/// Default number of ratings per chunk
pub const DEFAULT_CHUNK_SIZE: usize = 10_000;

/// A borrowed, contiguous slice of the rating stream.
#[derive(Debug, Clone, Copy)]
pub struct Chunk<'a> {
    /// Position of this chunk in the original stream (0-based)
    pub index: usize,
    pub ratings: &'a [Rating],
}

impl Chunk<'_> {
    /// Copy this chunk's ratings out, e.g. on a worker thread.
    pub fn to_owned_chunk(&self) -> OwnedChunk {
        OwnedChunk {
            index: self.index,
            ratings: self.ratings.to_vec(),
        }
    }
}

/// A chunk produced by a worker, ready to be merged.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedChunk {
    pub index: usize,
    pub ratings: Vec<Rating>,
}

/// Split `ratings` into contiguous chunks of `chunk_size`.
///
/// Every chunk holds exactly `chunk_size` ratings except the last, which
/// holds the remainder. An empty stream yields no chunks.
///
/// # Errors
/// `EngineError::InvalidArgument` if `chunk_size` is zero.
pub fn partition(ratings: &[Rating], chunk_size: usize) -> Result<Vec<Chunk<'_>>> {
    if chunk_size == 0 {
        return Err(EngineError::InvalidArgument(
            "chunk size must be at least 1".to_string(),
        ));
    }

    Ok(ratings
        .chunks(chunk_size)
        .enumerate()
        .map(|(index, ratings)| Chunk { index, ratings })
        .collect())
}

/// Concatenate chunks in original index order.
///
/// The input may arrive in any order.
pub fn merge(mut chunks: Vec<OwnedChunk>) -> Vec<Rating> {
    chunks.sort_by_key(|chunk| chunk.index);

    let total = chunks.iter().map(|chunk| chunk.ratings.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for chunk in chunks {
        merged.extend(chunk.ratings);
    }
    merged
}

/// Partition the stream, copy every chunk on a rayon worker, then merge.
///
/// Rayon's `collect` returns only after every worker has finished, so all
/// partial chunks are visible to `merge`. The result equals `ratings`.
pub fn partition_and_merge_parallel(ratings: &[Rating], chunk_size: usize) -> Result<Vec<Rating>> {
    let chunks = partition(ratings, chunk_size)?;
    debug!(
        "Partitioned {} ratings into {} chunks of up to {}",
        ratings.len(),
        chunks.len(),
        chunk_size
    );

    let partials: Vec<OwnedChunk> = chunks
        .par_iter()
        .map(|chunk| chunk.to_owned_chunk())
        .collect();

    Ok(merge(partials))
}
