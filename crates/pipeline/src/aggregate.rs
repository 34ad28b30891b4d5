//! Grouping ratings by movie.

use crate::partition::Chunk;
use data_loader::{MovieId, Rating};
use rayon::prelude::*;
use std::collections::HashMap;

/// Running count and sum of the scores a movie received.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovieStats {
    pub rating_count: u32,
    pub rating_sum: f64,
}

impl MovieStats {
    /// Add one observation.
    pub fn record(&mut self, score: f64) {
        self.rating_count += 1;
        self.rating_sum += score;
    }

    /// Arithmetic mean of the recorded scores.
    ///
    /// Stats only exist for movies with at least one rating, so the count
    /// is never zero for values produced by [`aggregate`].
    pub fn avg_rating(&self) -> f64 {
        if self.rating_count == 0 {
            return 0.0;
        }
        self.rating_sum / f64::from(self.rating_count)
    }

    /// Fold another partial result into this one.
    pub fn merge(&mut self, other: &MovieStats) {
        self.rating_count += other.rating_count;
        self.rating_sum += other.rating_sum;
    }
}

/// Group ratings by movie id and accumulate count and sum per movie.
///
/// Every rating counts, duplicates included. Movies without ratings are
/// absent from the result.
pub fn aggregate(ratings: &[Rating]) -> HashMap<MovieId, MovieStats> {
    let mut stats: HashMap<MovieId, MovieStats> = HashMap::new();
    for rating in ratings {
        stats.entry(rating.movie_id).or_default().record(rating.rating);
    }
    stats
}

/// Aggregate each chunk on the rayon pool, then fold the partials in chunk
/// order.
///
/// Counts always match [`aggregate`]. Sums match exactly when scores are
/// whole or half points, as in MovieLens; for arbitrary reals the grouping
/// of additions differs and the last bits may too.
pub fn aggregate_chunks(chunks: &[Chunk<'_>]) -> HashMap<MovieId, MovieStats> {
    let partials: Vec<HashMap<MovieId, MovieStats>> = chunks
        .par_iter()
        .map(|chunk| aggregate(chunk.ratings))
        .collect();

    let mut merged: HashMap<MovieId, MovieStats> = HashMap::new();
    for partial in &partials {
        for (movie_id, stats) in partial {
            merged.entry(*movie_id).or_default().merge(stats);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rating(user_id: u32, movie_id: MovieId, score: f64) -> Rating {
        Rating { user_id, movie_id, rating: score, timestamp: 0 }
    }

    #[test]
    fn test_aggregate_counts_and_means() {
        let stats = aggregate(&[
            rating(1, 1, 5.0),
            rating(2, 1, 3.0),
            rating(3, 2, 4.0),
        ]);

        assert_eq!(stats.len(), 2);
        assert_eq!(stats[&1].rating_count, 2);
        assert_eq!(stats[&1].avg_rating(), 4.0);
        assert_eq!(stats[&2].rating_count, 1);
        assert_eq!(stats[&2].avg_rating(), 4.0);
    }

    #[test]
    fn test_duplicate_ratings_each_count() {
        let stats = aggregate(&[rating(1, 9, 5.0), rating(1, 9, 2.0), rating(1, 9, 2.0)]);

        assert_eq!(stats[&9].rating_count, 3);
        assert_eq!(stats[&9].avg_rating(), 3.0);
    }

    #[test]
    fn test_real_valued_scores() {
        let stats = aggregate(&[rating(1, 4, 3.5), rating(2, 4, 4.25)]);
        assert_eq!(stats[&4].avg_rating(), 3.875);
    }

    #[test]
    fn test_chunked_aggregate_matches_whole() {
        let ratings: Vec<Rating> = (0..97)
            .map(|i| rating(i, i % 5, f64::from(i % 9 + 2) / 2.0))
            .collect();
        let whole = aggregate(&ratings);

        for chunk_size in [1, 4, 96, 200] {
            let chunks = crate::partition::partition(&ratings, chunk_size).unwrap();
            assert_eq!(aggregate_chunks(&chunks), whole);
        }
    }

    #[test]
    fn test_merge_partials() {
        let mut left = MovieStats::default();
        left.record(5.0);
        let mut right = MovieStats::default();
        right.record(2.0);
        right.record(2.0);

        left.merge(&right);
        assert_eq!(left.rating_count, 3);
        assert_eq!(left.avg_rating(), 3.0);
    }

    #[test]
    fn test_empty_input() {
        assert!(aggregate(&[]).is_empty());
        assert_eq!(MovieStats::default().avg_rating(), 0.0);
    }
}
