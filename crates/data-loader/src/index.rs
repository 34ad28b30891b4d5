//! Building a DataIndex from the MovieLens 100k files.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::{info, warn};

/// Lowest score accepted from `u.data`
pub const MIN_RATING: f64 = 1.0;
/// Highest score accepted from `u.data`
pub const MAX_RATING: f64 = 5.0;

impl DataIndex {
    /// Load the whole dataset from a directory containing `u.user`,
    /// `u.item` and `u.data`.
    ///
    /// The three files are parsed in parallel. Ratings that reference
    /// unknown users or movies are kept and only logged.
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading MovieLens dataset from {:?}", data_dir);

        let users_path = data_dir.join("u.user");
        let movies_path = data_dir.join("u.item");
        let ratings_path = data_dir.join("u.data");

        // Nested joins give three-way parallelism
        let ((users, movies), ratings) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_users(&users_path),
                    || parser::parse_movies(&movies_path),
                )
            },
            || parser::parse_ratings(&ratings_path),
        );

        let users = users?;
        let movies = movies?;
        let ratings = ratings?;

        info!(
            "Loaded {} users, {} movies, {} ratings",
            users.len(),
            movies.len(),
            ratings.len()
        );

        let index = Self::from_parts(users, movies, ratings)?;

        let dangling = index.dangling_references();
        if !dangling.is_empty() {
            warn!(
                unknown_users = dangling.unknown_users,
                unknown_movies = dangling.unknown_movies,
                "Some ratings reference unknown ids; they only count toward the general report"
            );
        }

        Ok(index)
    }

    /// Assemble an index from already parsed collections and validate it.
    pub fn from_parts(users: Vec<User>, movies: Vec<Movie>, ratings: Vec<Rating>) -> Result<Self> {
        let mut index = DataIndex::new();

        for user in users {
            index.insert_user(user);
        }
        for movie in movies {
            index.insert_movie(movie);
        }
        index.ratings = ratings;

        index.build_secondary_indices();
        index.validate()?;

        Ok(index)
    }

    /// Rebuild the genre -> movie ids index from the movie table.
    ///
    /// Id lists are sorted so lookups are reproducible across runs.
    pub fn build_secondary_indices(&mut self) {
        self.genre_index.clear();
        for (movie_id, movie) in &self.movies {
            for &genre in &movie.genres {
                self.genre_index
                    .entry(genre)
                    .or_insert_with(Vec::new)
                    .push(*movie_id);
            }
        }
        for ids in self.genre_index.values_mut() {
            ids.sort_unstable();
            ids.dedup();
        }
    }

    /// Check every rating score is finite and within [MIN_RATING, MAX_RATING].
    pub fn validate(&self) -> Result<()> {
        for rating in &self.ratings {
            if !rating.rating.is_finite()
                || rating.rating < MIN_RATING
                || rating.rating > MAX_RATING
            {
                return Err(DataLoadError::InvalidValue {
                    field: "rating".to_string(),
                    value: rating.rating.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn movie(id: MovieId, genres: Vec<Genre>) -> Movie {
        Movie {
            id,
            title: format!("Movie {}", id),
            genres,
        }
    }

    fn rating(user_id: UserId, movie_id: MovieId, score: f64) -> Rating {
        Rating {
            user_id,
            movie_id,
            rating: score,
            timestamp: 881250949,
        }
    }

    #[test]
    fn test_secondary_indices() {
        let index = DataIndex::from_parts(
            vec![],
            vec![
                movie(2, vec![Genre::Action, Genre::Drama]),
                movie(1, vec![Genre::Action]),
            ],
            vec![],
        )
        .unwrap();

        assert_eq!(index.get_movies_by_genre(Genre::Action), &[1, 2]);
        assert_eq!(index.get_movies_by_genre(Genre::Drama), &[2]);
        assert!(index.get_movies_by_genre(Genre::Western).is_empty());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let err = DataIndex::from_parts(vec![], vec![], vec![rating(1, 1, 7.0)]).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));

        let err = DataIndex::from_parts(vec![], vec![], vec![rating(1, 1, f64::NAN)]).unwrap_err();
        assert!(matches!(err, DataLoadError::InvalidValue { .. }));
    }

    #[test]
    fn test_dangling_references_are_not_errors() {
        let index = DataIndex::from_parts(
            vec![],
            vec![movie(1, vec![])],
            vec![rating(42, 1, 4.0), rating(42, 99, 3.0)],
        )
        .unwrap();

        let dangling = index.dangling_references();
        assert_eq!(dangling.unknown_users, 2);
        assert_eq!(dangling.unknown_movies, 1);
        assert_eq!(index.ratings().len(), 2);
    }

    #[test]
    fn test_load_missing_directory() {
        let err = DataIndex::load_from_files(Path::new("does/not/exist")).unwrap_err();
        assert!(matches!(err, DataLoadError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_dataset() {
        // Requires the MovieLens 100k files under data/ml-100k at the repo root
        let data_dir = Path::new("../../data/ml-100k");

        if data_dir.exists() {
            let index = DataIndex::load_from_files(data_dir).unwrap();
            let (users, movies, ratings) = index.counts();

            assert_eq!(users, 943);
            assert_eq!(movies, 1682);
            assert_eq!(ratings, 100000);
        }
    }
}
