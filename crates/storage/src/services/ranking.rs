use std::collections::HashSet;
use std::sync::Arc;

use crate::dto::ranking::UserStanding;
use crate::error::Result;
use crate::models::{
    Competition, LeaderboardSnapshot, NewCompetition, NewUser, User, UserCompetition,
    UserCompetitionFilter,
};
use crate::store::RecordStore;

/// Per-competition and overall rankings computed from the record store.
///
/// Orderings are ascending (rank 1 is first place) and ties keep the
/// store's order: registration order inside a competition, user creation
/// order overall.
#[derive(Clone)]
pub struct RankingEngine {
    store: Arc<dyn RecordStore>,
}

impl RankingEngine {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Create a user with a hashed password
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User> {
        let user = self.store.create_user(NewUser::new(username, password)?).await?;
        tracing::info!(user_id = user.user_id, username = %user.username, "User created");
        Ok(user)
    }

    pub async fn get_user(&self, user_id: i32) -> Result<User> {
        self.store.get_user(user_id).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.store.list_users().await
    }

    /// Check a username/password pair, returning the user on success
    pub async fn login(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.store.find_user_by_username(username).await?;
        Ok(user.filter(|user| user.check_password(password)))
    }

    pub async fn create_competition(&self, name: &str, location: &str) -> Result<Competition> {
        let competition = self
            .store
            .create_competition(NewCompetition::new(name, location))
            .await?;
        tracing::info!(
            comp_id = competition.comp_id,
            name = %competition.name,
            "Competition created"
        );
        Ok(competition)
    }

    pub async fn get_competition(&self, comp_id: i32) -> Result<Competition> {
        self.store.get_competition(comp_id).await
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>> {
        self.store.list_competitions().await
    }

    /// Register a user for a competition with an initial rank, failing with
    /// `DuplicateRegistration` for a pair already registered
    pub async fn register(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<UserCompetition> {
        let record = self
            .store
            .create_user_competition(user_id, comp_id, rank)
            .await?;
        tracing::info!(user_id, comp_id, rank, "User registered for competition");
        Ok(record)
    }

    /// Overwrite the competition-local rank of an existing registration
    pub async fn update_competition_rank(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition> {
        let record = self
            .store
            .update_user_competition_rank(user_id, comp_id, rank)
            .await?;
        tracing::debug!(user_id, comp_id, rank, "Competition rank updated");
        Ok(record)
    }

    /// The `n` best registrations of a competition
    pub async fn top_n_in_competition(&self, comp_id: i32, n: usize) -> Result<Vec<UserCompetition>> {
        self.store.get_competition(comp_id).await?;

        let mut records = self
            .store
            .list_user_competitions(UserCompetitionFilter::by_competition(comp_id))
            .await?;
        records.sort_by_key(|record| record.rank);
        records.truncate(n);

        Ok(records)
    }

    /// Add `delta_points` to the user's overall rank
    pub async fn update_overall_rank(&self, user_id: i32, delta_points: i64) -> Result<User> {
        let user = self.store.add_overall_rank(user_id, delta_points).await?;
        tracing::debug!(
            user_id,
            delta_points,
            overall_rank = user.overall_rank,
            "Overall rank adjusted"
        );
        Ok(user)
    }

    /// Users with at least one propagated result, best overall rank first
    pub async fn ranked_users(&self) -> Result<Vec<User>> {
        let registered: HashSet<i32> = self
            .store
            .list_user_competitions(UserCompetitionFilter::default())
            .await?
            .into_iter()
            .filter(|record| record.applied_rank.is_some())
            .map(|record| record.user_id)
            .collect();

        let mut users: Vec<User> = self
            .store
            .list_users()
            .await?
            .into_iter()
            .filter(|user| registered.contains(&user.user_id))
            .collect();
        users.sort_by_key(|user| user.overall_rank);

        Ok(users)
    }

    pub async fn top_n_overall(&self, n: usize) -> Result<Vec<User>> {
        let mut users = self.ranked_users().await?;
        users.truncate(n);
        Ok(users)
    }

    /// Snapshot of the overall top `n`
    pub async fn leaderboard(&self, n: usize) -> Result<LeaderboardSnapshot> {
        let users = self.top_n_overall(n).await?;
        Ok(LeaderboardSnapshot::from_ordered(
            users.into_iter().map(|user| user.user_id),
        ))
    }

    /// Fold every pending competition rank change into the participants'
    /// overall ranks, returning the users whose registration was folded in
    pub async fn propagate_competition(&self, comp_id: i32) -> Result<Vec<User>> {
        self.store.get_competition(comp_id).await?;

        let records = self
            .store
            .list_user_competitions(UserCompetitionFilter::by_competition(comp_id))
            .await?;

        let mut affected = Vec::new();
        for record in records {
            if record.is_applied() {
                continue;
            }

            let user = self.store.apply_pending_rank(record.user_id, comp_id).await?;
            tracing::debug!(
                user_id = user.user_id,
                comp_id,
                overall_rank = user.overall_rank,
                "Competition rank applied"
            );
            affected.push(user);
        }

        tracing::info!(
            comp_id,
            affected = affected.len(),
            "Competition ranks propagated to overall ranking"
        );

        Ok(affected)
    }

    /// Overall rank of a user and their 1-indexed place in the overall ordering
    pub async fn user_standing(&self, user_id: i32) -> Result<UserStanding> {
        let user = self.store.get_user(user_id).await?;
        let position = self
            .ranked_users()
            .await?
            .iter()
            .position(|ranked| ranked.user_id == user_id)
            .map(|index| index as u32 + 1);

        Ok(UserStanding {
            user_id: user.user_id,
            username: user.username,
            overall_rank: user.overall_rank,
            position,
        })
    }

    /// All registrations of a user
    pub async fn user_rankings(&self, user_id: i32) -> Result<Vec<UserCompetition>> {
        self.store.get_user(user_id).await?;
        self.store
            .list_user_competitions(UserCompetitionFilter::by_user(user_id))
            .await
    }

    /// Competitions a user is registered for, in registration order
    pub async fn user_competitions(&self, user_id: i32) -> Result<Vec<Competition>> {
        let mut competitions = Vec::new();
        for record in self.user_rankings(user_id).await? {
            competitions.push(self.store.get_competition(record.comp_id).await?);
        }
        Ok(competitions)
    }

    /// Participants of a competition, in registration order
    pub async fn competition_users(&self, comp_id: i32) -> Result<Vec<User>> {
        self.store.get_competition(comp_id).await?;

        let records = self
            .store
            .list_user_competitions(UserCompetitionFilter::by_competition(comp_id))
            .await?;

        let mut users = Vec::with_capacity(records.len());
        for record in records {
            users.push(self.store.get_user(record.user_id).await?);
        }
        Ok(users)
    }

    /// Read and clear the user's pending notification
    pub async fn take_notification(&self, user_id: i32) -> Result<Option<String>> {
        let user = self.store.get_user(user_id).await?;
        if user.notification.is_some() {
            self.store.set_notification(user_id, None).await?;
        }
        Ok(user.notification)
    }
}
