use async_trait::async_trait;

use crate::Database;
use crate::error::Result;
use crate::models::{
    Competition, NewCompetition, NewUser, User, UserCompetition, UserCompetitionFilter,
};
use crate::repository::competition::CompetitionRepository;
use crate::repository::user::UserRepository;
use crate::repository::user_competition::UserCompetitionRepository;

use super::RecordStore;

/// [`RecordStore`] backed by the Postgres repositories
#[derive(Clone)]
pub struct PgStore {
    db: Database,
}

impl PgStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    fn users(&self) -> UserRepository<'_> {
        UserRepository::new(self.db.pool())
    }

    fn competitions(&self) -> CompetitionRepository<'_> {
        CompetitionRepository::new(self.db.pool())
    }

    fn registrations(&self) -> UserCompetitionRepository<'_> {
        UserCompetitionRepository::new(self.db.pool())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        self.users().create(&new_user).await
    }

    async fn get_user(&self, user_id: i32) -> Result<User> {
        self.users().find_by_id(user_id).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.users().find_by_username(username).await
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        self.users().list().await
    }

    async fn add_overall_rank(&self, user_id: i32, delta: i64) -> Result<User> {
        self.users().add_overall_rank(user_id, delta).await
    }

    async fn set_notification(&self, user_id: i32, notification: Option<String>) -> Result<User> {
        self.users()
            .set_notification(user_id, notification.as_deref())
            .await
    }

    async fn create_competition(&self, new_competition: NewCompetition) -> Result<Competition> {
        self.competitions().create(&new_competition).await
    }

    async fn get_competition(&self, comp_id: i32) -> Result<Competition> {
        self.competitions().find_by_id(comp_id).await
    }

    async fn list_competitions(&self) -> Result<Vec<Competition>> {
        self.competitions().list().await
    }

    async fn create_user_competition(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition> {
        // Surface which side of the join is missing before the foreign keys do.
        self.get_user(user_id).await?;
        self.get_competition(comp_id).await?;

        self.registrations().create(user_id, comp_id, rank).await
    }

    async fn get_user_competition(&self, user_id: i32, comp_id: i32) -> Result<UserCompetition> {
        self.registrations().find(user_id, comp_id).await
    }

    async fn list_user_competitions(
        &self,
        filter: UserCompetitionFilter,
    ) -> Result<Vec<UserCompetition>> {
        self.registrations().list(&filter).await
    }

    async fn update_user_competition_rank(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition> {
        self.registrations().update_rank(user_id, comp_id, rank).await
    }

    async fn apply_pending_rank(&self, user_id: i32, comp_id: i32) -> Result<User> {
        self.registrations()
            .apply_pending_rank(user_id, comp_id)
            .await
    }
}
