use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{Record, Result, StorageError};
use crate::models::{
    Competition, NewCompetition, NewUser, User, UserCompetition, UserCompetitionFilter,
};

use super::RecordStore;

#[derive(Default)]
struct Tables {
    users: BTreeMap<i32, User>,
    competitions: BTreeMap<i32, Competition>,
    registrations: HashMap<(i32, i32), UserCompetition>,
    next_user_id: i32,
    next_comp_id: i32,
    next_registration_seq: i64,
}

impl Tables {
    fn user_mut(&mut self, user_id: i32) -> Result<&mut User> {
        self.users
            .get_mut(&user_id)
            .ok_or(StorageError::RecordNotFound(Record::User(user_id)))
    }

    fn registration_mut(&mut self, user_id: i32, comp_id: i32) -> Result<&mut UserCompetition> {
        self.registrations
            .get_mut(&(user_id, comp_id))
            .ok_or(StorageError::RecordNotFound(Record::UserCompetition {
                user_id,
                comp_id,
            }))
    }
}

/// Process-local [`RecordStore`] with ids starting at 1 like the serial columns
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn now() -> chrono::NaiveDateTime {
    chrono::Utc::now().naive_utc()
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.tables.write().await;

        if tables
            .users
            .values()
            .any(|user| user.username == new_user.username)
        {
            return Err(StorageError::ConstraintViolation(
                "Username already exists".to_string(),
            ));
        }

        tables.next_user_id += 1;
        let user = User {
            user_id: tables.next_user_id,
            username: new_user.username,
            password: new_user.password,
            overall_rank: 0,
            notification: None,
            created_at: now(),
        };
        tables.users.insert(user.user_id, user.clone());

        Ok(user)
    }

    async fn get_user(&self, user_id: i32) -> Result<User> {
        self.tables
            .read()
            .await
            .users
            .get(&user_id)
            .cloned()
            .ok_or(StorageError::RecordNotFound(Record::User(user_id)))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn add_overall_rank(&self, user_id: i32, delta: i64) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables.user_mut(user_id)?;
        user.overall_rank += delta;
        Ok(user.clone())
    }

    async fn set_notification(&self, user_id: i32, notification: Option<String>) -> Result<User> {
        let mut tables = self.tables.write().await;
        let user = tables.user_mut(user_id)?;
        user.notification = notification;
        Ok(user.clone())
    }

    async fn create_competition(&self, new_competition: NewCompetition) -> Result<Competition> {
        let mut tables = self.tables.write().await;

        tables.next_comp_id += 1;
        let competition = Competition {
            comp_id: tables.next_comp_id,
            name: new_competition.name,
            location: new_competition.location,
            created_at: now(),
        };
        tables
            .competitions
            .insert(competition.comp_id, competition.clone());

        Ok(competition)
    }

    async fn get_competition(&self, comp_id: i32) -> Result<Competition> {
        self.tables
            .read()
            .await
            .competitions
            .get(&comp_id)
            .cloned()
            .ok_or(StorageError::RecordNotFound(Record::Competition(comp_id)))
    }

    async fn list_competitions(&self) -> Result<Vec<Competition>> {
        Ok(self
            .tables
            .read()
            .await
            .competitions
            .values()
            .cloned()
            .collect())
    }

    async fn create_user_competition(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&user_id) {
            return Err(StorageError::RecordNotFound(Record::User(user_id)));
        }
        if !tables.competitions.contains_key(&comp_id) {
            return Err(StorageError::RecordNotFound(Record::Competition(comp_id)));
        }
        if tables.registrations.contains_key(&(user_id, comp_id)) {
            return Err(StorageError::DuplicateRegistration { user_id, comp_id });
        }

        tables.next_registration_seq += 1;
        let record = UserCompetition {
            user_id,
            comp_id,
            rank,
            applied_rank: None,
            registration_seq: tables.next_registration_seq,
            registered_at: now(),
        };
        tables
            .registrations
            .insert((user_id, comp_id), record.clone());

        Ok(record)
    }

    async fn get_user_competition(&self, user_id: i32, comp_id: i32) -> Result<UserCompetition> {
        self.tables
            .read()
            .await
            .registrations
            .get(&(user_id, comp_id))
            .cloned()
            .ok_or(StorageError::RecordNotFound(Record::UserCompetition {
                user_id,
                comp_id,
            }))
    }

    async fn list_user_competitions(
        &self,
        filter: UserCompetitionFilter,
    ) -> Result<Vec<UserCompetition>> {
        let tables = self.tables.read().await;

        let mut records: Vec<UserCompetition> = tables
            .registrations
            .values()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect();
        records.sort_by_key(|record| record.registration_seq);

        Ok(records)
    }

    async fn update_user_competition_rank(
        &self,
        user_id: i32,
        comp_id: i32,
        rank: i32,
    ) -> Result<UserCompetition> {
        let mut tables = self.tables.write().await;
        let record = tables.registration_mut(user_id, comp_id)?;
        record.rank = rank;
        Ok(record.clone())
    }

    async fn apply_pending_rank(&self, user_id: i32, comp_id: i32) -> Result<User> {
        let mut tables = self.tables.write().await;

        let record = tables.registration_mut(user_id, comp_id)?;
        let (rank, delta) = (record.rank, record.pending_delta());

        let user = tables.user_mut(user_id)?;
        user.overall_rank += delta;
        let user = user.clone();

        tables.registration_mut(user_id, comp_id)?.applied_rank = Some(rank);

        Ok(user)
    }
}
