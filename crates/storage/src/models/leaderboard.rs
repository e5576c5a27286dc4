use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of a leaderboard snapshot, positions are 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub user_id: i32,
    pub position: u32,
}

impl LeaderboardEntry {
    pub fn new(user_id: i32, position: u32) -> Self {
        Self { user_id, position }
    }
}

/// Ordered top-N view of the overall ranking at one point in time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardSnapshot {
    pub entries: Vec<LeaderboardEntry>,
}

impl LeaderboardSnapshot {
    /// Builds a snapshot from user ids already sorted best first
    pub fn from_ordered<I>(user_ids: I) -> Self
    where
        I: IntoIterator<Item = i32>,
    {
        let entries = user_ids
            .into_iter()
            .zip(1u32..)
            .map(|(user_id, position)| LeaderboardEntry::new(user_id, position))
            .collect();

        Self { entries }
    }

    pub fn position_of(&self, user_id: i32) -> Option<u32> {
        self.entries
            .iter()
            .find(|entry| entry.user_id == user_id)
            .map(|entry| entry.position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<Vec<LeaderboardEntry>> for LeaderboardSnapshot {
    fn from(entries: Vec<LeaderboardEntry>) -> Self {
        Self { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_are_one_indexed() {
        let snapshot = LeaderboardSnapshot::from_ordered([7, 3, 9]);
        assert_eq!(snapshot.position_of(7), Some(1));
        assert_eq!(snapshot.position_of(3), Some(2));
        assert_eq!(snapshot.position_of(9), Some(3));
        assert_eq!(snapshot.position_of(1), None);
    }
}
