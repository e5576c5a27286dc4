use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Registration of a user in a competition, identified by `(user_id, comp_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct UserCompetition {
    pub user_id: i32,
    pub comp_id: i32,
    /// Competition-local placement, 1 is first place
    pub rank: i32,
    /// The rank already folded into the user's overall rank, `None` until
    /// the first propagation
    #[serde(skip)]
    pub applied_rank: Option<i32>,
    /// Monotonic registration order, used to break rank ties
    #[serde(skip)]
    pub registration_seq: i64,
    pub registered_at: chrono::NaiveDateTime,
}

impl UserCompetition {
    /// Overall rank points not yet applied to the user
    pub fn pending_delta(&self) -> i64 {
        i64::from(self.rank) - i64::from(self.applied_rank.unwrap_or(0))
    }

    pub fn is_applied(&self) -> bool {
        self.applied_rank == Some(self.rank)
    }
}

/// Filter for scanning registrations, empty fields match everything
#[derive(Debug, Clone, Copy, Default)]
pub struct UserCompetitionFilter {
    pub user_id: Option<i32>,
    pub comp_id: Option<i32>,
}

impl UserCompetitionFilter {
    pub fn by_user(user_id: i32) -> Self {
        Self {
            user_id: Some(user_id),
            comp_id: None,
        }
    }

    pub fn by_competition(comp_id: i32) -> Self {
        Self {
            user_id: None,
            comp_id: Some(comp_id),
        }
    }

    pub fn matches(&self, record: &UserCompetition) -> bool {
        self.user_id.is_none_or(|id| id == record.user_id)
            && self.comp_id.is_none_or(|id| id == record.comp_id)
    }
}
