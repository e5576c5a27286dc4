//! Change detection between two successive leaderboard snapshots.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use utoipa::ToSchema;

use crate::models::LeaderboardSnapshot;

use super::TOP_N;

/// Position reported for users that fell out of the tracked window
pub const REMOVED_POSITION: u32 = TOP_N as u32 + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Moved,
    Entered,
    Removed,
}

/// Reported difference for one user whose position changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LeaderboardChange {
    Moved { user_id: i32, from: u32, to: u32 },
    Entered { user_id: i32, position: u32 },
    Removed { user_id: i32, from: u32 },
}

impl LeaderboardChange {
    pub fn user_id(&self) -> i32 {
        match *self {
            Self::Moved { user_id, .. }
            | Self::Entered { user_id, .. }
            | Self::Removed { user_id, .. } => user_id,
        }
    }

    pub fn kind(&self) -> ChangeKind {
        match self {
            Self::Moved { .. } => ChangeKind::Moved,
            Self::Entered { .. } => ChangeKind::Entered,
            Self::Removed { .. } => ChangeKind::Removed,
        }
    }

    pub fn old_position(&self) -> Option<u32> {
        match *self {
            Self::Moved { from, .. } | Self::Removed { from, .. } => Some(from),
            Self::Entered { .. } => None,
        }
    }

    pub fn new_position(&self) -> u32 {
        match *self {
            Self::Moved { to, .. } => to,
            Self::Entered { position, .. } => position,
            Self::Removed { .. } => REMOVED_POSITION,
        }
    }
}

/// Compare `previous` against `current`.
///
/// Moved and removed users come first, in `previous` order, followed by
/// entered users in `current` order. A user id is reported at most once even
/// if a snapshot lists it twice; the last listed position wins.
pub fn detect_changes(
    previous: &LeaderboardSnapshot,
    current: &LeaderboardSnapshot,
) -> Vec<LeaderboardChange> {
    let previous_positions: HashMap<i32, u32> = previous
        .entries
        .iter()
        .map(|entry| (entry.user_id, entry.position))
        .collect();
    let current_positions: HashMap<i32, u32> = current
        .entries
        .iter()
        .map(|entry| (entry.user_id, entry.position))
        .collect();

    let mut seen = HashSet::new();
    let mut changes = Vec::new();

    for entry in &previous.entries {
        if !seen.insert(entry.user_id) {
            continue;
        }

        let from = previous_positions[&entry.user_id];
        match current_positions.get(&entry.user_id) {
            Some(&to) if to != from => changes.push(LeaderboardChange::Moved {
                user_id: entry.user_id,
                from,
                to,
            }),
            Some(_) => {}
            None => changes.push(LeaderboardChange::Removed {
                user_id: entry.user_id,
                from,
            }),
        }
    }

    for entry in &current.entries {
        if !seen.insert(entry.user_id) {
            continue;
        }

        changes.push(LeaderboardChange::Entered {
            user_id: entry.user_id,
            position: current_positions[&entry.user_id],
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LeaderboardEntry;

    fn full_board() -> LeaderboardSnapshot {
        LeaderboardSnapshot::from_ordered(1..=20)
    }

    fn board(pairs: &[(i32, u32)]) -> LeaderboardSnapshot {
        pairs
            .iter()
            .map(|&(user_id, position)| LeaderboardEntry::new(user_id, position))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn test_identical_snapshots_report_nothing() {
        assert!(detect_changes(&full_board(), &full_board()).is_empty());
    }

    #[test]
    fn test_moved_users_report_exact_positions() {
        let mut current = full_board();
        current.entries[1].position = 3;
        current.entries[9].position = 13;

        let changes = detect_changes(&full_board(), &current);
        assert_eq!(
            changes,
            vec![
                LeaderboardChange::Moved {
                    user_id: 2,
                    from: 2,
                    to: 3
                },
                LeaderboardChange::Moved {
                    user_id: 10,
                    from: 10,
                    to: 13
                },
            ]
        );
    }

    #[test]
    fn test_removed_user_reported_at_window_edge() {
        let current = LeaderboardSnapshot::from_ordered((1..=20).filter(|&id| id != 7));
        let changes = detect_changes(&full_board(), &current);

        let removed: Vec<_> = changes
            .iter()
            .filter(|change| change.kind() == ChangeKind::Removed)
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].user_id(), 7);
        assert_eq!(removed[0].old_position(), Some(7));
        assert_eq!(removed[0].new_position(), 21);

        // Everyone below 7 moved up one place.
        let moved: Vec<i32> = changes
            .iter()
            .filter(|change| change.kind() == ChangeKind::Moved)
            .map(|change| change.user_id())
            .collect();
        assert_eq!(moved, (8..=20).collect::<Vec<_>>());
    }

    #[test]
    fn test_entered_users_follow_previous_order() {
        let previous = board(&[(1, 1), (2, 2), (3, 3)]);
        let current = board(&[(4, 1), (1, 2), (2, 3)]);

        let changes = detect_changes(&previous, &current);
        assert_eq!(
            changes,
            vec![
                LeaderboardChange::Moved {
                    user_id: 1,
                    from: 1,
                    to: 2
                },
                LeaderboardChange::Moved {
                    user_id: 2,
                    from: 2,
                    to: 3
                },
                LeaderboardChange::Removed {
                    user_id: 3,
                    from: 3
                },
                LeaderboardChange::Entered {
                    user_id: 4,
                    position: 1
                },
            ]
        );
        assert_eq!(changes[3].old_position(), None);
        assert_eq!(changes[3].new_position(), 1);
    }

    #[test]
    fn test_empty_previous_snapshot_reports_entries_only() {
        let changes = detect_changes(&LeaderboardSnapshot::default(), &full_board());
        assert_eq!(changes.len(), 20);
        assert!(changes.iter().all(|c| c.kind() == ChangeKind::Entered));
    }

    #[test]
    fn test_duplicate_user_reported_once() {
        let previous = board(&[(1, 1), (1, 2)]);
        let current = board(&[(1, 5)]);

        let changes = detect_changes(&previous, &current);
        assert_eq!(
            changes,
            vec![LeaderboardChange::Moved {
                user_id: 1,
                from: 2,
                to: 5
            }]
        );
    }
}
