//! Core domain types for the MovieLens 100k dataset.
//!
//! Everything here is loaded once and then shared read-only across
//! report workers, so the types are plain data with public fields.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// Type Aliases
// =============================================================================

/// Unique identifier for a user (1-943 in MovieLens 100k)
pub type UserId = u32;

/// Unique identifier for a movie (1-1682 in MovieLens 100k)
pub type MovieId = u32;

// =============================================================================
// User-related Types
// =============================================================================

/// A user from `u.user`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Age in years, as recorded in the dataset (not bucketed)
    pub age: u32,
    pub gender: Gender,
    pub occupation: String,
    /// Locality code; some users have none
    pub zipcode: Option<String>,
}

/// Gender codes used by the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
}

impl Gender {
    /// The single-letter code stored in `u.user`
    pub fn code(&self) -> &'static str {
        match self {
            Gender::Male => "M",
            Gender::Female => "F",
        }
    }

    /// Human readable label, used for report names
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "M" | "m" => Ok(Gender::Male),
            "F" | "f" => Ok(Gender::Female),
            other => Err(format!("unknown gender code '{}'", other)),
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

// =============================================================================
// Movie-related Types
// =============================================================================

/// A movie from `u.item`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    /// Genres flagged for this movie; may be empty
    pub genres: Vec<Genre>,
}

/// Movie genres from MovieLens 100k.
///
/// The declaration order matches the order of the genre flag columns in
/// `u.item`, so `Genre::ALL[i]` is the genre of flag column `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Genre {
    Unknown,
    Action,
    Adventure,
    Animation,
    Children,
    Comedy,
    Crime,
    Documentary,
    Drama,
    Fantasy,
    FilmNoir,
    Horror,
    Musical,
    Mystery,
    Romance,
    SciFi,
    Thriller,
    War,
    Western,
}

impl Genre {
    /// All genres, in `u.item` flag column order
    pub const ALL: [Genre; 19] = [
        Genre::Unknown,
        Genre::Action,
        Genre::Adventure,
        Genre::Animation,
        Genre::Children,
        Genre::Comedy,
        Genre::Crime,
        Genre::Documentary,
        Genre::Drama,
        Genre::Fantasy,
        Genre::FilmNoir,
        Genre::Horror,
        Genre::Musical,
        Genre::Mystery,
        Genre::Romance,
        Genre::SciFi,
        Genre::Thriller,
        Genre::War,
        Genre::Western,
    ];

    /// Genre for a flag column index; indexes past the known set map to `Unknown`
    pub fn from_flag_index(index: usize) -> Genre {
        Genre::ALL.get(index).copied().unwrap_or(Genre::Unknown)
    }

    /// Label as written in the dataset's `u.genre` file
    pub fn label(&self) -> &'static str {
        match self {
            Genre::Unknown => "Unknown",
            Genre::Action => "Action",
            Genre::Adventure => "Adventure",
            Genre::Animation => "Animation",
            Genre::Children => "Children's",
            Genre::Comedy => "Comedy",
            Genre::Crime => "Crime",
            Genre::Documentary => "Documentary",
            Genre::Drama => "Drama",
            Genre::Fantasy => "Fantasy",
            Genre::FilmNoir => "Film-Noir",
            Genre::Horror => "Horror",
            Genre::Musical => "Musical",
            Genre::Mystery => "Mystery",
            Genre::Romance => "Romance",
            Genre::SciFi => "Sci-Fi",
            Genre::Thriller => "Thriller",
            Genre::War => "War",
            Genre::Western => "Western",
        }
    }
}

impl FromStr for Genre {
    type Err = String;

    /// Accepts the dataset labels plus a few spellings seen in the wild
    /// ("Children", "Children’s", "SciFi", "FilmNoir"), case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        let genre = match normalized.as_str() {
            "unknown" => Genre::Unknown,
            "action" => Genre::Action,
            "adventure" => Genre::Adventure,
            "animation" => Genre::Animation,
            "children" | "childrens" => Genre::Children,
            "comedy" => Genre::Comedy,
            "crime" => Genre::Crime,
            "documentary" => Genre::Documentary,
            "drama" => Genre::Drama,
            "fantasy" => Genre::Fantasy,
            "filmnoir" => Genre::FilmNoir,
            "horror" => Genre::Horror,
            "musical" => Genre::Musical,
            "mystery" => Genre::Mystery,
            "romance" => Genre::Romance,
            "scifi" => Genre::SciFi,
            "thriller" => Genre::Thriller,
            "war" => Genre::War,
            "western" => Genre::Western,
            _ => return Err(format!("unknown genre '{}'", s)),
        };
        Ok(genre)
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// =============================================================================
// Rating Type
// =============================================================================

/// A single observation from `u.data`.
///
/// Scores are kept as `f64`: the 100k files only contain integers 1-5, but
/// nothing downstream relies on that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
    /// Unix timestamp; carried along but not used for ranking
    pub timestamp: i64,
}

// =============================================================================
// DataIndex - The In-Memory Dataset View
// =============================================================================

/// Read-only view over users, movies and the rating stream.
///
/// Ratings are kept in load order because the partitioner slices them
/// positionally. Users and movies are keyed by id for O(1) lookups.
#[derive(Debug, Clone, Default)]
pub struct DataIndex {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) movies: HashMap<MovieId, Movie>,
    pub(crate) ratings: Vec<Rating>,

    /// Movies grouped by genre (one movie can appear in multiple genre lists)
    pub(crate) genre_index: HashMap<Genre, Vec<MovieId>>,
}

/// Ratings whose user or movie id does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DanglingReferences {
    pub unknown_users: usize,
    pub unknown_movies: usize,
}

impl DanglingReferences {
    pub fn is_empty(&self) -> bool {
        self.unknown_users == 0 && self.unknown_movies == 0
    }
}

impl DataIndex {
    /// Creates a new, empty DataIndex
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_user(&self, id: UserId) -> Option<&User> {
        self.users.get(&id)
    }

    pub fn get_movie(&self, id: MovieId) -> Option<&Movie> {
        self.movies.get(&id)
    }

    /// All users, in no particular order
    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.users.values()
    }

    /// All movies, in no particular order
    pub fn movies(&self) -> impl Iterator<Item = &Movie> {
        self.movies.values()
    }

    /// The full rating stream, in load order
    pub fn ratings(&self) -> &[Rating] {
        &self.ratings
    }

    /// Get all movies in a specific genre
    ///
    /// Only populated after `build_secondary_indices` has run.
    pub fn get_movies_by_genre(&self, genre: Genre) -> &[MovieId] {
        self.genre_index
            .get(&genre)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Display title for a movie, or a placeholder when the id is unknown.
    pub fn title_for(&self, movie_id: MovieId) -> String {
        match self.movies.get(&movie_id) {
            Some(movie) => movie.title.clone(),
            None => format!("Unknown movie #{}", movie_id),
        }
    }

    pub fn insert_user(&mut self, user: User) {
        self.users.insert(user.id, user);
    }

    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.insert(movie.id, movie);
    }

    /// Append a rating to the stream. Ratings are never deduplicated.
    pub fn insert_rating(&mut self, rating: Rating) {
        self.ratings.push(rating);
    }

    /// Get counts for debugging/validation
    pub fn counts(&self) -> (usize, usize, usize) {
        (self.users.len(), self.movies.len(), self.ratings.len())
    }

    /// Count ratings pointing at users or movies that are not loaded.
    ///
    /// A rating with both ids unknown is counted once in each column.
    pub fn dangling_references(&self) -> DanglingReferences {
        self.ratings
            .iter()
            .fold(DanglingReferences::default(), |mut acc, rating| {
                if !self.users.contains_key(&rating.user_id) {
                    acc.unknown_users += 1;
                }
                if !self.movies.contains_key(&rating.movie_id) {
                    acc.unknown_movies += 1;
                }
                acc
            })
    }
}
