//! Rank update → leaderboard recompute → change detection → notification.
//!
//! Two notification policies exist side by side and are kept as separate
//! entry points:
//!
//! * [`Orchestrator::manage_top_20_and_notify`] tells every user currently
//!   in the overall top 20 where they stand, changed or not.
//! * [`Orchestrator::update_and_notify_top_20`] diffs the leaderboard around
//!   a recompute and only tells users who moved or dropped out.
//!
//! Cycles for the same competition never overlap; cycles for different
//! competitions may run concurrently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::OwnedMutexGuard;
use utoipa::ToSchema;

use crate::error::Result;
use crate::models::{LeaderboardSnapshot, UserCompetition};

use super::TOP_N;
use super::leaderboard::{LeaderboardChange, detect_changes};
use super::notification::{NotificationDispatcher, standing_message};
use super::ranking::RankingEngine;

/// One async mutex per competition id, created on first use
#[derive(Default)]
struct CompetitionLocks {
    locks: Mutex<HashMap<i32, Arc<tokio::sync::Mutex<()>>>>,
}

impl CompetitionLocks {
    async fn acquire(&self, comp_id: i32) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(comp_id)
            .or_default()
            .clone();

        lock.lock_owned().await
    }
}

/// Outcome of one orchestration cycle
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CycleReport {
    pub comp_id: i32,
    /// Best registrations of the competition after the cycle
    pub competition_top: Vec<UserCompetition>,
    /// Overall top 20 after the cycle
    pub leaderboard: LeaderboardSnapshot,
    /// Detected changes, empty for the notify-all policy
    pub changes: Vec<LeaderboardChange>,
    /// Users a notification was dispatched to, in dispatch order
    pub notified: Vec<i32>,
    /// Dispatches the transport rejected
    pub failed_deliveries: usize,
}

pub struct Orchestrator {
    engine: RankingEngine,
    dispatcher: NotificationDispatcher,
    locks: CompetitionLocks,
}

impl Orchestrator {
    pub fn new(engine: RankingEngine, dispatcher: NotificationDispatcher) -> Self {
        Self {
            engine,
            dispatcher,
            locks: CompetitionLocks::default(),
        }
    }

    pub fn engine(&self) -> &RankingEngine {
        &self.engine
    }

    // Only existing competitions get a lock entry.
    async fn lock(&self, comp_id: i32) -> Result<OwnedMutexGuard<()>> {
        self.engine.get_competition(comp_id).await?;
        Ok(self.locks.acquire(comp_id).await)
    }

    /// Register a user for a competition, serialized with that
    /// competition's cycles
    pub async fn register(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<UserCompetition> {
        let _guard = self.lock(comp_id).await?;
        self.engine.register(user_id, comp_id, rank).await
    }

    /// Overwrite a competition rank without running a cycle
    pub async fn update_rank(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<UserCompetition> {
        let _guard = self.lock(comp_id).await?;
        self.engine
            .update_competition_rank(user_id, comp_id, rank)
            .await
    }

    /// Propagate the competition's pending ranks, then notify every user of
    /// the overall top 20 of their position
    pub async fn manage_top_20_and_notify(&self, comp_id: i32) -> Result<CycleReport> {
        let _guard = self.lock(comp_id).await?;

        self.engine.propagate_competition(comp_id).await?;
        let competition_top = self.engine.top_n_in_competition(comp_id, TOP_N).await?;
        let leaderboard = self.engine.leaderboard(TOP_N).await?;

        let mut notified = Vec::with_capacity(leaderboard.len());
        let mut failed_deliveries = 0;
        for entry in &leaderboard.entries {
            let delivered = self
                .dispatcher
                .notify(entry.user_id, &standing_message(entry.position))
                .await;
            if !delivered {
                failed_deliveries += 1;
            }
            notified.push(entry.user_id);
        }

        tracing::info!(
            comp_id,
            notified = notified.len(),
            failed_deliveries,
            "Top 20 notified"
        );

        Ok(CycleReport {
            comp_id,
            competition_top,
            leaderboard,
            changes: Vec::new(),
            notified,
            failed_deliveries,
        })
    }

    /// Propagate the competition's pending ranks and notify only the users
    /// whose top 20 position changed or who dropped out of it
    pub async fn update_and_notify_top_20(&self, comp_id: i32) -> Result<CycleReport> {
        let _guard = self.lock(comp_id).await?;

        let previous = self.engine.leaderboard(TOP_N).await?;
        self.delta_cycle(comp_id, previous).await
    }

    /// Full pipeline for one rank update event: overwrite the rank, then run
    /// the delta cycle against the leaderboard as it was before the write
    pub async fn submit_rank(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<CycleReport> {
        let _guard = self.lock(comp_id).await?;

        let previous = self.engine.leaderboard(TOP_N).await?;
        self.engine
            .update_competition_rank(user_id, comp_id, rank)
            .await?;
        self.delta_cycle(comp_id, previous).await
    }

    // Caller holds the competition lock.
    async fn delta_cycle(&self, comp_id: i32, previous: LeaderboardSnapshot) -> Result<CycleReport> {
        self.engine.propagate_competition(comp_id).await?;
        let competition_top = self.engine.top_n_in_competition(comp_id, TOP_N).await?;
        let leaderboard = self.engine.leaderboard(TOP_N).await?;

        let changes = detect_changes(&previous, &leaderboard);

        let mut notified = Vec::new();
        let mut failed_deliveries = 0;
        for change in &changes {
            if let Some(delivered) = self.dispatcher.notify_change(change).await {
                if !delivered {
                    failed_deliveries += 1;
                }
                notified.push(change.user_id());
            }
        }

        tracing::info!(
            comp_id,
            changes = changes.len(),
            notified = notified.len(),
            failed_deliveries,
            "Leaderboard changes notified"
        );

        Ok(CycleReport {
            comp_id,
            competition_top,
            leaderboard,
            changes,
            notified,
            failed_deliveries,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::error::{Record, StorageError};
    use crate::services::notification::testing::RecordingTransport;
    use crate::services::notification::{moved_message, removed_message};
    use crate::store::InMemoryStore;

    async fn setup(users: usize, transport: Arc<RecordingTransport>) -> Orchestrator {
        let engine = RankingEngine::new(Arc::new(InMemoryStore::new()));
        for i in 1..=users {
            engine
                .create_user(&format!("user{}", i), "bobpass")
                .await
                .unwrap();
        }
        engine.create_competition("theboys", "sando").await.unwrap();

        Orchestrator::new(engine, NotificationDispatcher::new(transport))
    }

    #[tokio::test]
    async fn test_notify_all_excludes_worst_of_21() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(21, transport.clone()).await;

        // Distinct ranks; user 4 is the worst.
        for user_id in 1..=21 {
            let rank = if user_id == 4 { 99 } else { user_id };
            orchestrator.register(user_id, 1, rank).await.unwrap();
        }

        let report = orchestrator.manage_top_20_and_notify(1).await.unwrap();

        let sent = transport.sent();
        let recipients: HashSet<i32> = sent.iter().map(|(user_id, _)| *user_id).collect();
        assert_eq!(sent.len(), 20);
        assert_eq!(recipients.len(), 20);
        assert!(!recipients.contains(&4));
        assert_eq!(report.notified.len(), 20);
        assert_eq!(report.competition_top.len(), 20);
        assert!(report.changes.is_empty());
        assert_eq!(sent[0], (1, standing_message(1)));
    }

    #[tokio::test]
    async fn test_notify_all_repeats_without_changes() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(3, transport.clone()).await;
        for user_id in 1..=3 {
            orchestrator.register(user_id, 1, user_id).await.unwrap();
        }

        orchestrator.manage_top_20_and_notify(1).await.unwrap();
        orchestrator.manage_top_20_and_notify(1).await.unwrap();

        assert_eq!(transport.sent().len(), 6);
    }

    #[tokio::test]
    async fn test_delta_cycle_notifies_movers_only() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(3, transport.clone()).await;
        for user_id in 1..=3 {
            orchestrator.register(user_id, 1, user_id * 10).await.unwrap();
        }

        // First cycle: everyone enters, nobody is notified.
        let report = orchestrator.update_and_notify_top_20(1).await.unwrap();
        assert_eq!(report.changes.len(), 3);
        assert!(report.notified.is_empty());
        assert!(transport.sent().is_empty());

        // User 3 overtakes user 2; user 1 keeps first place.
        orchestrator.update_rank(3, 1, 15).await.unwrap();
        let report = orchestrator.update_and_notify_top_20(1).await.unwrap();

        assert_eq!(report.notified, vec![2, 3]);
        assert_eq!(
            transport.sent(),
            vec![(2, moved_message(2, 3)), (3, moved_message(3, 2))]
        );
        assert_eq!(report.leaderboard.position_of(1), Some(1));
        assert_eq!(report.leaderboard.position_of(3), Some(2));
    }

    #[tokio::test]
    async fn test_submit_rank_reports_removal() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(21, transport.clone()).await;
        for user_id in 1..=21 {
            orchestrator.register(user_id, 1, user_id).await.unwrap();
        }
        orchestrator.update_and_notify_top_20(1).await.unwrap();
        assert!(transport.sent().is_empty());

        // User 21 jumps to first and pushes user 20 out of the window.
        let report = orchestrator.submit_rank(21, 1, 0).await.unwrap();

        let removed: Vec<_> = report
            .changes
            .iter()
            .filter(|change| matches!(change, LeaderboardChange::Removed { .. }))
            .collect();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].user_id(), 20);
        assert_eq!(removed[0].new_position(), 21);

        let sent = transport.sent();
        assert!(sent.contains(&(20, removed_message())));
        assert!(sent.contains(&(1, moved_message(1, 2))));
        // The newcomer is not notified.
        assert!(sent.iter().all(|(user_id, _)| *user_id != 21));

        let recipients: HashSet<i32> = sent.iter().map(|(user_id, _)| *user_id).collect();
        assert_eq!(recipients.len(), sent.len());
    }

    #[tokio::test]
    async fn test_failed_delivery_does_not_roll_back() {
        let transport = Arc::new(RecordingTransport::failing_for(vec![1]));
        let orchestrator = setup(2, transport.clone()).await;
        orchestrator.register(1, 1, 1).await.unwrap();
        orchestrator.register(2, 1, 2).await.unwrap();
        orchestrator.update_and_notify_top_20(1).await.unwrap();

        let report = orchestrator.submit_rank(2, 1, 0).await.unwrap();

        assert_eq!(report.failed_deliveries, 1);
        assert_eq!(report.notified, vec![1, 2]);
        assert_eq!(transport.sent(), vec![(2, moved_message(2, 1))]);
        let record = orchestrator
            .engine()
            .store()
            .get_user_competition(2, 1)
            .await
            .unwrap();
        assert_eq!(record.rank, 0);
    }

    #[tokio::test]
    async fn test_unknown_competition_is_not_found() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(1, transport).await;

        for result in [
            orchestrator.manage_top_20_and_notify(7).await,
            orchestrator.update_and_notify_top_20(7).await,
        ] {
            assert!(matches!(
                result.unwrap_err(),
                StorageError::RecordNotFound(Record::Competition(7))
            ));
        }
    }

    #[tokio::test]
    async fn test_unknown_competitions_leave_no_lock_entries() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = setup(1, transport).await;

        for comp_id in 2..=100 {
            assert!(orchestrator.manage_top_20_and_notify(comp_id).await.is_err());
            assert!(orchestrator.register(1, comp_id, 1).await.is_err());
            assert!(orchestrator.submit_rank(1, comp_id, 1).await.is_err());
        }
        orchestrator.register(1, 1, 1).await.unwrap();

        let entries = orchestrator.locks.locks.lock().unwrap().len();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_concurrent_submissions_for_one_competition() {
        let transport = Arc::new(RecordingTransport::default());
        let orchestrator = Arc::new(setup(10, transport.clone()).await);
        for user_id in 1..=10 {
            orchestrator.register(user_id, 1, user_id).await.unwrap();
        }
        orchestrator.update_and_notify_top_20(1).await.unwrap();

        let handles: Vec<_> = (1..=10)
            .map(|user_id| {
                let orchestrator = orchestrator.clone();
                tokio::spawn(async move { orchestrator.submit_rank(user_id, 1, 20 - user_id).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        // Each rank change was folded in exactly once.
        for user_id in 1..=10 {
            let user = orchestrator.engine().get_user(user_id).await.unwrap();
            assert_eq!(user.overall_rank, i64::from(20 - user_id));
        }
        let board = orchestrator.engine().leaderboard(TOP_N).await.unwrap();
        assert_eq!(board.entries[0].user_id, 10);
    }
}
