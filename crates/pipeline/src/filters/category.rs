//! Filter keeping ratings of movies in one genre.

use crate::traits::Filter;
use data_loader::{DataIndex, Genre, MovieId, Rating};
use std::collections::HashSet;

/// Keeps ratings whose movie exists and is tagged with the given genre.
///
/// The movie set comes from a pass over the movie table, so movies
/// inserted or re-tagged after the genre index was built are seen too.
pub struct CategoryFilter {
    name: String,
    movie_ids: HashSet<MovieId>,
}

impl CategoryFilter {
    pub fn new(data_index: &DataIndex, genre: Genre) -> Self {
        let movie_ids: HashSet<MovieId> = data_index
            .movies()
            .filter(|movie| movie.genres.contains(&genre))
            .map(|movie| movie.id)
            .collect();

        Self {
            name: format!("CategoryFilter({})", genre),
            movie_ids,
        }
    }
}

impl Filter for CategoryFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, rating: &Rating) -> bool {
        self.movie_ids.contains(&rating.movie_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::Movie;

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();

        index.insert_movie(Movie {
            id: 1,
            title: "Action Movie".to_string(),
            genres: vec![Genre::Action, Genre::Adventure],
        });
        index.insert_movie(Movie {
            id: 2,
            title: "Drama Movie".to_string(),
            genres: vec![Genre::Drama],
        });

        index
    }

    #[test]
    fn test_category_filter_with_and_without_genre_index() {
        let mut index = create_test_index();

        let ratings = vec![
            Rating { user_id: 1, movie_id: 1, rating: 5.0, timestamp: 0 },
            Rating { user_id: 1, movie_id: 2, rating: 3.0, timestamp: 0 },
            // Unknown movie
            Rating { user_id: 1, movie_id: 3, rating: 4.0, timestamp: 0 },
        ];

        let filtered = CategoryFilter::new(&index, Genre::Action).apply(&ratings).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].movie_id, 1);

        index.build_secondary_indices();
        let filtered = CategoryFilter::new(&index, Genre::Drama).apply(&ratings).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].movie_id, 2);
    }

    #[test]
    fn test_category_filter_sees_movies_changed_after_index_build() {
        let mut index = create_test_index();
        index.build_secondary_indices();

        index.insert_movie(Movie {
            id: 3,
            title: "Late Action Movie".to_string(),
            genres: vec![Genre::Action],
        });
        index.insert_movie(Movie {
            id: 1,
            title: "Action Movie".to_string(),
            genres: vec![Genre::Drama],
        });

        let action = CategoryFilter::new(&index, Genre::Action);
        assert!(action.matches(&Rating { user_id: 1, movie_id: 3, rating: 4.0, timestamp: 0 }));
        assert!(!action.matches(&Rating { user_id: 1, movie_id: 1, rating: 5.0, timestamp: 0 }));

        let drama = CategoryFilter::new(&index, Genre::Drama);
        assert!(drama.matches(&Rating { user_id: 1, movie_id: 1, rating: 5.0, timestamp: 0 }));
    }

    #[test]
    fn test_category_filter_empty_genre() {
        let index = create_test_index();
        let filter = CategoryFilter::new(&index, Genre::Western);

        assert!(!filter.matches(&Rating { user_id: 1, movie_id: 1, rating: 5.0, timestamp: 0 }));
    }
}
