use sqlx::{PgPool, QueryBuilder};

use crate::error::{Record, Result, StorageError};
use crate::models::{User, UserCompetition, UserCompetitionFilter};

use super::user::USER_COLUMNS;

/// Repository for the user/competition join table
pub struct UserCompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserCompetitionRepository<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find(&self, user_id: i32, comp_id: i32) -> Result<UserCompetition> {
        sqlx::query_as::<_, UserCompetition>(
            r#"
            SELECT user_id, comp_id, rank, applied_rank, registration_seq, registered_at
            FROM user_competitions
            WHERE user_id = $1 AND comp_id = $2
            "#,
        )
        .bind(user_id)
        .bind(comp_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::RecordNotFound(Record::UserCompetition {
            user_id,
            comp_id,
        }))
    }

    /// Scan registrations in registration order
    pub async fn list(&self, filter: &UserCompetitionFilter) -> Result<Vec<UserCompetition>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT user_id, comp_id, rank, applied_rank, registration_seq, registered_at
            FROM user_competitions
            WHERE 1=1
            "#,
        );

        if let Some(user_id) = filter.user_id {
            query.push(" AND user_id = ");
            query.push_bind(user_id);
        }

        if let Some(comp_id) = filter.comp_id {
            query.push(" AND comp_id = ");
            query.push_bind(comp_id);
        }

        query.push(" ORDER BY registration_seq");

        let records = query
            .build_query_as::<UserCompetition>()
            .fetch_all(self.pool)
            .await?;

        Ok(records)
    }

    pub async fn create(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<UserCompetition> {
        sqlx::query_as::<_, UserCompetition>(
            r#"
            INSERT INTO user_competitions (user_id, comp_id, rank)
            VALUES ($1, $2, $3)
            RETURNING user_id, comp_id, rank, applied_rank, registration_seq, registered_at
            "#,
        )
        .bind(user_id)
        .bind(comp_id)
        .bind(rank)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            let error = StorageError::from(e);
            if error.is_unique_violation() {
                StorageError::DuplicateRegistration { user_id, comp_id }
            } else if error.is_foreign_key_violation() {
                StorageError::ConstraintViolation(
                    "Registration references a missing user or competition".to_string(),
                )
            } else {
                error
            }
        })
    }

    pub async fn update_rank(&self, user_id: i32, comp_id: i32, rank: i32) -> Result<UserCompetition> {
        sqlx::query_as::<_, UserCompetition>(
            r#"
            UPDATE user_competitions
            SET rank = $3
            WHERE user_id = $1 AND comp_id = $2
            RETURNING user_id, comp_id, rank, applied_rank, registration_seq, registered_at
            "#,
        )
        .bind(user_id)
        .bind(comp_id)
        .bind(rank)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::RecordNotFound(Record::UserCompetition {
            user_id,
            comp_id,
        }))
    }

    /// Fold the pending rank of a registration into the user's overall rank
    /// and mark it applied, in one transaction
    pub async fn apply_pending_rank(&self, user_id: i32, comp_id: i32) -> Result<User> {
        let mut tx = self.pool.begin().await?;

        let record = sqlx::query_as::<_, UserCompetition>(
            r#"
            SELECT user_id, comp_id, rank, applied_rank, registration_seq, registered_at
            FROM user_competitions
            WHERE user_id = $1 AND comp_id = $2
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .bind(comp_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::RecordNotFound(Record::UserCompetition {
            user_id,
            comp_id,
        }))?;

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET overall_rank = overall_rank + $2
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(record.pending_delta())
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StorageError::RecordNotFound(Record::User(user_id)))?;

        sqlx::query(
            r#"
            UPDATE user_competitions
            SET applied_rank = $3
            WHERE user_id = $1 AND comp_id = $2
            "#,
        )
        .bind(user_id)
        .bind(comp_id)
        .bind(record.rank)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(user)
    }
}
