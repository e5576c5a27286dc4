use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user's overall rank and place in the overall ordering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserStanding {
    pub user_id: i32,
    pub username: String,
    pub overall_rank: i64,
    /// 1-indexed, `None` until one of the user's results was propagated
    pub position: Option<u32>,
}

/// One row of the overall top 20
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct OverallRankingEntry {
    pub position: u32,
    pub user_id: i32,
    pub username: String,
    pub overall_rank: i64,
}
