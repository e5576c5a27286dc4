use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    dto::{
        competition::CompetitionResponse,
        ranking::UserStanding,
        user::{CreateUserRequest, NotificationResponse, UserResponse},
    },
    models::UserCompetition,
};
use validator::Validate;

use crate::error::{ApiResult, WebError};
use crate::state::AppState;

use super::services;

#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "List all users", body = Vec<UserResponse>)
    ),
    tag = "users"
)]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<UserResponse>>> {
    let users = services::list_users(state.engine()).await?;
    Ok(Json(users))
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "User created successfully", body = UserResponse),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username already exists")
    ),
    tag = "users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let user = services::create_user(state.engine(), &req).await?;

    Ok((StatusCode::CREATED, Json(user)).into_response())
}

#[utoipa::path(
    post,
    path = "/api/users/login",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = UserResponse),
        (status = 401, description = "Unknown user or wrong password")
    ),
    tag = "users"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    services::login(state.engine(), &req.username, &req.password)
        .await?
        .map(Json)
        .ok_or(WebError::Unauthorized)
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserResponse>> {
    Ok(Json(services::get_user(state.engine(), user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/standing",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Overall rank and position of the user", body = UserStanding),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_standing(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<UserStanding>> {
    Ok(Json(services::get_standing(state.engine(), user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/rankings",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Competition ranks of the user", body = Vec<UserCompetition>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_rankings(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<Vec<UserCompetition>>> {
    Ok(Json(services::get_rankings(state.engine(), user_id).await?))
}

#[utoipa::path(
    get,
    path = "/api/users/{user_id}/competitions",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    responses(
        (status = 200, description = "Competitions the user is registered for", body = Vec<CompetitionResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn get_competitions(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<Vec<CompetitionResponse>>> {
    Ok(Json(
        services::get_competitions(state.engine(), user_id).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/api/users/{user_id}/notification",
    params(
        ("user_id" = i32, Path, description = "User id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Pending notification, now cleared", body = NotificationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found")
    ),
    tag = "users"
)]
pub async fn take_notification(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<Json<NotificationResponse>> {
    Ok(Json(
        services::take_notification(state.engine(), user_id).await?,
    ))
}
