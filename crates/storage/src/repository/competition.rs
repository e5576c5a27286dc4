use sqlx::PgPool;

use crate::error::{Record, Result, StorageError};
use crate::models::{Competition, NewCompetition};

/// Repository for Competition database operations
pub struct CompetitionRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CompetitionRepository<'a> {
    /// Create a new CompetitionRepository
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all competitions
    pub async fn list(&self) -> Result<Vec<Competition>> {
        let competitions = sqlx::query_as::<_, Competition>(
            r#"
            SELECT comp_id, name, location, created_at
            FROM competitions
            ORDER BY comp_id
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(competitions)
    }

    /// Get a competition by ID
    pub async fn find_by_id(&self, comp_id: i32) -> Result<Competition> {
        sqlx::query_as::<_, Competition>(
            r#"
            SELECT comp_id, name, location, created_at
            FROM competitions
            WHERE comp_id = $1
            "#,
        )
        .bind(comp_id)
        .fetch_optional(self.pool)
        .await?
        .ok_or(StorageError::RecordNotFound(Record::Competition(comp_id)))
    }

    /// Create a new competition
    pub async fn create(&self, new_competition: &NewCompetition) -> Result<Competition> {
        let competition = sqlx::query_as::<_, Competition>(
            r#"
            INSERT INTO competitions (name, location)
            VALUES ($1, $2)
            RETURNING comp_id, name, location, created_at
            "#,
        )
        .bind(&new_competition.name)
        .bind(&new_competition.location)
        .fetch_one(self.pool)
        .await?;

        Ok(competition)
    }
}
