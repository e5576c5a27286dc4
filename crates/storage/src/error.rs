use std::fmt;

use thiserror::Error;

/// Identifies the record a lookup or update was aimed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Record {
    User(i32),
    Competition(i32),
    UserCompetition { user_id: i32, comp_id: i32 },
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {}", id),
            Self::Competition(id) => write!(f, "competition {}", id),
            Self::UserCompetition { user_id, comp_id } => {
                write!(f, "registration of user {} in competition {}", user_id, comp_id)
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    RecordNotFound(Record),

    #[error("User {user_id} is already registered for competition {comp_id}")]
    DuplicateRegistration { user_id: i32, comp_id: i32 },

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Password hashing error: {0}")]
    Credential(#[from] bcrypt::BcryptError),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::RecordNotFound(_))
    }
}
