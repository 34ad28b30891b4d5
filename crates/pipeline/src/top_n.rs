//! Ranking aggregated movies and keeping the best N.

use crate::aggregate::MovieStats;
use data_loader::MovieId;
use std::cmp::Ordering;
use std::collections::HashMap;

/// A movie's position-relevant statistics in a ranking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedMovie {
    pub movie_id: MovieId,
    pub avg_rating: f64,
    pub rating_count: u32,
}

impl RankedMovie {
    pub fn new(movie_id: MovieId, stats: &MovieStats) -> Self {
        Self {
            movie_id,
            avg_rating: stats.avg_rating(),
            rating_count: stats.rating_count,
        }
    }
}

/// Ranking order: mean descending, then count descending, then id ascending.
///
/// Ids are unique within one aggregation, so no two distinct movies
/// compare equal and the order is total.
pub fn compare_ranked(a: &RankedMovie, b: &RankedMovie) -> Ordering {
    b.avg_rating
        .total_cmp(&a.avg_rating)
        .then_with(|| b.rating_count.cmp(&a.rating_count))
        .then_with(|| a.movie_id.cmp(&b.movie_id))
}

/// The first `min(n, stats.len())` movies under [`compare_ranked`].
///
/// The result only depends on the contents of `stats`, never on its
/// iteration order. Short results are not padded.
pub fn select_top(stats: &HashMap<MovieId, MovieStats>, n: usize) -> Vec<RankedMovie> {
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<RankedMovie> = stats
        .iter()
        .map(|(&movie_id, stats)| RankedMovie::new(movie_id, stats))
        .collect();

    // Partition around the n-th element first so only the head gets sorted
    if ranked.len() > n {
        ranked.select_nth_unstable_by(n - 1, compare_ranked);
        ranked.truncate(n);
    }
    ranked.sort_unstable_by(compare_ranked);
    ranked
}
