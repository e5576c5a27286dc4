use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::Result;

#[cfg(not(test))]
const HASH_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const HASH_COST: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i32,
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    /// Cross-competition score moved only by deltas, lower is better
    pub overall_rank: i64,
    /// Last message delivered to the user and not yet read
    pub notification: Option<String>,
    pub created_at: chrono::NaiveDateTime,
}

impl User {
    /// Hashes a plain text password into the credential stored on the user
    pub fn hash_password(password: &str) -> Result<String> {
        Ok(bcrypt::hash(password, HASH_COST)?)
    }

    pub fn check_password(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password).unwrap_or(false)
    }
}

/// User not stored yet, with an already hashed password
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: &str) -> Result<Self> {
        Ok(Self {
            username: username.into(),
            password: User::hash_password(password)?,
        })
    }
}
