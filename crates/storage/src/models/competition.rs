use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Competition {
    pub comp_id: i32,
    pub name: String,
    pub location: String,
    pub created_at: chrono::NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewCompetition {
    pub name: String,
    pub location: String,
}

impl NewCompetition {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
        }
    }
}
