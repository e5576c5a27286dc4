use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use storage::{
    dto::{
        competition::{
            CompetitionResponse, CreateCompetitionRequest, RegisterRequest, UpdateRankRequest,
        },
        user::UserResponse,
    },
    models::UserCompetition,
    services::{TOP_N, orchestrator::CycleReport},
};
use utoipa::IntoParams;
use validator::Validate;

use crate::error::{ApiResult, WebError};
use crate::state::AppState;

use super::services;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TopParams {
    /// Number of registrations to return, 1 to 20
    pub limit: Option<usize>,
}

#[utoipa::path(
    get,
    path = "/api/competitions",
    responses(
        (status = 200, description = "List all competitions successfully", body = Vec<CompetitionResponse>)
    ),
    tag = "competitions"
)]
pub async fn list_competitions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<CompetitionResponse>>> {
    Ok(Json(services::list_competitions(state.engine()).await?))
}

#[utoipa::path(
    post,
    path = "/api/competitions",
    request_body = CreateCompetitionRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Competition created successfully", body = CompetitionResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "competitions"
)]
pub async fn create_competition(
    State(state): State<AppState>,
    Json(req): Json<CreateCompetitionRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let competition = services::create_competition(state.engine(), &req).await?;

    Ok((StatusCode::CREATED, Json(competition)).into_response())
}

#[utoipa::path(
    get,
    path = "/api/competitions/{comp_id}",
    params(
        ("comp_id" = i32, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Competition found", body = CompetitionResponse),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_competition(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
) -> ApiResult<Json<CompetitionResponse>> {
    Ok(Json(
        services::get_competition(state.engine(), comp_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{comp_id}/participants",
    params(
        ("comp_id" = i32, Path, description = "Competition id")
    ),
    responses(
        (status = 200, description = "Participants in registration order", body = Vec<UserResponse>),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn list_participants(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
) -> ApiResult<Json<Vec<UserResponse>>> {
    Ok(Json(
        services::list_participants(state.engine(), comp_id).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/api/competitions/{comp_id}/top",
    params(
        ("comp_id" = i32, Path, description = "Competition id"),
        TopParams
    ),
    responses(
        (status = 200, description = "Best ranks of the competition, ties in registration order", body = Vec<UserCompetition>),
        (status = 400, description = "Invalid limit"),
        (status = 404, description = "Competition not found")
    ),
    tag = "competitions"
)]
pub async fn get_top(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
    Query(params): Query<TopParams>,
) -> ApiResult<Json<Vec<UserCompetition>>> {
    let limit = params.limit.unwrap_or(TOP_N);
    if !(1..=TOP_N).contains(&limit) {
        return Err(WebError::BadRequest(format!(
            "limit must be between 1 and {}",
            TOP_N
        )));
    }

    Ok(Json(services::top(state.engine(), comp_id, limit).await?))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{comp_id}/participants",
    params(
        ("comp_id" = i32, Path, description = "Competition id")
    ),
    request_body = RegisterRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User registered", body = UserCompetition),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User or competition not found"),
        (status = 409, description = "User already registered")
    ),
    tag = "competitions"
)]
pub async fn register(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let record = services::register(&state, comp_id, req.user_id, req.rank).await?;

    Ok((StatusCode::CREATED, Json(record)).into_response())
}

#[utoipa::path(
    put,
    path = "/api/competitions/{comp_id}/participants/{user_id}",
    params(
        ("comp_id" = i32, Path, description = "Competition id"),
        ("user_id" = i32, Path, description = "User id")
    ),
    request_body = UpdateRankRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Rank updated and leaderboard changes notified", body = CycleReport),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Registration not found")
    ),
    tag = "competitions"
)]
pub async fn submit_rank(
    State(state): State<AppState>,
    Path((comp_id, user_id)): Path<(i32, i32)>,
    Json(req): Json<UpdateRankRequest>,
) -> ApiResult<Json<CycleReport>> {
    req.validate()?;

    Ok(Json(
        services::submit_rank(&state, comp_id, user_id, req.rank).await?,
    ))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{comp_id}/leaderboard/notify-all",
    params(
        ("comp_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Every user of the overall top 20 notified", body = CycleReport),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "leaderboard"
)]
pub async fn notify_all(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
) -> ApiResult<Json<CycleReport>> {
    Ok(Json(services::notify_all(&state, comp_id).await?))
}

#[utoipa::path(
    post,
    path = "/api/competitions/{comp_id}/leaderboard/notify-changes",
    params(
        ("comp_id" = i32, Path, description = "Competition id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending ranks propagated and changed positions notified", body = CycleReport),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Competition not found")
    ),
    tag = "leaderboard"
)]
pub async fn notify_changes(
    State(state): State<AppState>,
    Path(comp_id): Path<i32>,
) -> ApiResult<Json<CycleReport>> {
    Ok(Json(services::notify_changes(&state, comp_id).await?))
}
