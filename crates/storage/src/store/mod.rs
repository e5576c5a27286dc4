//! Record store collaborator used by the ranking services.
//!
//! The services only talk to [`RecordStore`]; [`PgStore`] persists to
//! Postgres and [`InMemoryStore`] keeps everything in process memory.

mod memory;
mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    Competition, NewCompetition, NewUser, User, UserCompetition, UserCompetitionFilter,
};

/// Create / get / list / update access to users, competitions and
/// registrations. Every update is atomic for the single record it touches.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User>;

    /// Fails with `RecordNotFound` when the user does not exist
    async fn get_user(&self, user_id: i32) -> Result<User>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// All users in creation order
    async fn list_users(&self) -> Result<Vec<User>>;

    /// Adds `delta` to the user's overall rank and returns the updated user
    async fn add_overall_rank(&self, user_id: i32, delta: i64) -> Result<User>;

    async fn set_notification(&self, user_id: i32, notification: Option<String>) -> Result<User>;

    async fn create_competition(&self, new_competition: NewCompetition) -> Result<Competition>;

    async fn get_competition(&self, comp_id: i32) -> Result<Competition>;

    async fn list_competitions(&self) -> Result<Vec<Competition>>;

    /// Fails with `DuplicateRegistration` when the pair already exists
    async fn create_user_competition(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition>;

    async fn get_user_competition(&self, user_id: i32, comp_id: i32) -> Result<UserCompetition>;

    /// Registrations matching `filter`, in registration order
    async fn list_user_competitions(
        &self,
        filter: UserCompetitionFilter,
    ) -> Result<Vec<UserCompetition>>;

    async fn update_user_competition_rank(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition>;

    /// Adds the registration's pending delta to the user's overall rank and
    /// marks its rank as applied, both or neither
    async fn apply_pending_rank(&self, user_id: i32, comp_id: i32) -> Result<User>;
}
