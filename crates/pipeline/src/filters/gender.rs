//! Filter keeping ratings made by users of one gender.

use crate::traits::Filter;
use data_loader::{DataIndex, Gender, Rating, UserId};
use std::collections::HashSet;

/// Keeps ratings whose user exists and has the given gender.
///
/// ## Algorithm
/// 1. At construction, collect the ids of every user with `gender`
/// 2. A rating matches iff its user id is in that set
///
/// Ratings from unknown users never match.
pub struct GenderFilter {
    name: String,
    user_ids: HashSet<UserId>,
}

impl GenderFilter {
    /// Build the qualifying user set from the dataset.
    pub fn new(data_index: &DataIndex, gender: Gender) -> Self {
        let user_ids = data_index
            .users()
            .filter(|user| user.gender == gender)
            .map(|user| user.id)
            .collect();

        Self {
            name: format!("GenderFilter({})", gender.code()),
            user_ids,
        }
    }

    /// Number of users that qualify
    pub fn qualifying_users(&self) -> usize {
        self.user_ids.len()
    }
}

impl Filter for GenderFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, rating: &Rating) -> bool {
        self.user_ids.contains(&rating.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data_loader::User;

    fn create_test_index() -> DataIndex {
        let mut index = DataIndex::new();
        for (id, gender) in [(1, Gender::Male), (2, Gender::Female), (3, Gender::Male)] {
            index.insert_user(User {
                id,
                age: 30,
                gender,
                occupation: "writer".to_string(),
                zipcode: None,
            });
        }
        index
    }

    #[test]
    fn test_gender_filter() {
        let index = create_test_index();
        let filter = GenderFilter::new(&index, Gender::Male);
        assert_eq!(filter.qualifying_users(), 2);
        assert_eq!(filter.name(), "GenderFilter(M)");

        let ratings = vec![
            Rating { user_id: 1, movie_id: 10, rating: 5.0, timestamp: 0 },
            Rating { user_id: 2, movie_id: 10, rating: 3.0, timestamp: 0 },
            Rating { user_id: 3, movie_id: 11, rating: 4.0, timestamp: 0 },
            // Unknown user
            Rating { user_id: 99, movie_id: 11, rating: 4.0, timestamp: 0 },
        ];

        let filtered = filter.apply(&ratings).unwrap();
        let users: Vec<UserId> = filtered.iter().map(|r| r.user_id).collect();
        assert_eq!(users, vec![1, 3]);
    }
}
