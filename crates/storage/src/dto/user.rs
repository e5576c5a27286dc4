use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::User;

/// Request payload for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Username must be between 1 and 255 characters"
    ))]
    #[validate(custom(function = "validate_username"))]
    pub username: String,

    #[validate(length(min = 1, max = 72, message = "Password must be between 1 and 72 characters"))]
    pub password: String,
}

/// Response containing public user information
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub user_id: i32,
    pub username: String,
    pub overall_rank: i64,
    pub created_at: NaiveDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            overall_rank: user.overall_rank,
            created_at: user.created_at,
        }
    }
}

/// Pending notification of a user, cleared once read
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NotificationResponse {
    pub user_id: i32,
    pub message: Option<String>,
}

fn validate_username(username: &str) -> Result<(), validator::ValidationError> {
    if username.chars().any(char::is_whitespace) {
        return Err(validator::ValidationError::new("username_whitespace"));
    }
    Ok(())
}
