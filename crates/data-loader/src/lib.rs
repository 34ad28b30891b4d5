//! # Data Loader Crate
//!
//! Loads the MovieLens 100k dataset into an in-memory, read-only view.
//!
//! ## Main Components
//!
//! - **types**: Core domain types (User, Movie, Rating, DataIndex)
//! - **parser**: Parse `u.user`, `u.item` and `u.data` into Rust structs
//! - **index**: Build and validate a DataIndex from the parsed files
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::DataIndex;
//! use std::path::Path;
//!
//! let index = DataIndex::load_from_files(Path::new("data/ml-100k"))?;
//!
//! let user = index.get_user(1).unwrap();
//! let title = index.title_for(50);
//! println!("{} ratings loaded", index.ratings().len());
//! ```

pub mod error;
pub mod types;
pub mod parser;
pub mod index;

pub use error::{DataLoadError, Result};
pub use index::{MAX_RATING, MIN_RATING};
pub use types::{
    // Type aliases
    UserId,
    MovieId,
    // Core types
    User,
    Movie,
    Rating,
    DataIndex,
    DanglingReferences,
    // Enums
    Gender,
    Genre,
};
