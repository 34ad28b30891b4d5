//! Filter keeping ratings made by users within an age band.

use crate::traits::Filter;
use data_loader::{DataIndex, Rating, UserId};
use std::collections::HashSet;

/// Keeps ratings whose user exists and satisfies `min <= age <= max`.
///
/// `max == None` leaves the band open above.
pub struct AgeRangeFilter {
    name: String,
    user_ids: HashSet<UserId>,
}

impl AgeRangeFilter {
    pub fn new(data_index: &DataIndex, min: u32, max: Option<u32>) -> Self {
        let user_ids = data_index
            .users()
            .filter(|user| user.age >= min && max.is_none_or(|max| user.age <= max))
            .map(|user| user.id)
            .collect();

        let name = match max {
            Some(max) => format!("AgeRangeFilter({}-{})", min, max),
            None => format!("AgeRangeFilter({}+)", min),
        };

        Self { name, user_ids }
    }
}

impl Filter for AgeRangeFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, rating: &Rating) -> bool {
        self.user_ids.contains(&rating.user_id)
    }
}
