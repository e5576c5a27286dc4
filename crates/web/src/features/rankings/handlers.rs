use axum::{Json, extract::State};
use storage::dto::ranking::OverallRankingEntry;

use crate::error::ApiResult;
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/rankings/overall",
    responses(
        (status = 200, description = "Overall top 20, lowest overall rank first", body = Vec<OverallRankingEntry>)
    ),
    tag = "rankings"
)]
pub async fn get_overall_ranking(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OverallRankingEntry>>> {
    Ok(Json(services::overall_top(state.engine()).await?))
}
