use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::Competition;

/// Request payload for creating a new competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCompetitionRequest {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Name must be between 1 and 255 characters"
    ))]
    pub name: String,

    #[validate(length(
        min = 1,
        max = 255,
        message = "Location must be between 1 and 255 characters"
    ))]
    pub location: String,
}

/// Request payload for registering a user in a competition
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    pub user_id: i32,

    #[validate(range(min = 0, message = "Rank must not be negative"))]
    pub rank: i32,
}

/// Request payload for changing a competition rank
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateRankRequest {
    #[validate(range(min = 0, message = "Rank must not be negative"))]
    pub rank: i32,
}

/// Response containing competition details
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompetitionResponse {
    pub comp_id: i32,
    pub name: String,
    pub location: String,
    pub created_at: NaiveDateTime,
}

impl From<Competition> for CompetitionResponse {
    fn from(competition: Competition) -> Self {
        Self {
            comp_id: competition.comp_id,
            name: competition.name,
            location: competition.location,
            created_at: competition.created_at,
        }
    }
}
