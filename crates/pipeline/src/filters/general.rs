//! Filter for the unfiltered, general report.

use crate::traits::Filter;
use data_loader::Rating;

/// Accepts every rating, including ones with dangling user or movie ids.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeneralFilter;

impl Filter for GeneralFilter {
    fn name(&self) -> &str {
        "GeneralFilter"
    }

    fn matches(&self, _rating: &Rating) -> bool {
        true
    }

    fn apply(&self, ratings: &[Rating]) -> anyhow::Result<Vec<Rating>> {
        Ok(ratings.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_general_filter_keeps_everything() {
        let ratings = vec![
            Rating { user_id: 1, movie_id: 1, rating: 4.0, timestamp: 0 },
            Rating { user_id: 404, movie_id: 404, rating: 1.0, timestamp: 0 },
        ];

        let filtered = GeneralFilter.apply(&ratings).unwrap();
        assert_eq!(filtered, ratings);
    }
}
