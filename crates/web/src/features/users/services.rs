use storage::{
    dto::{
        competition::CompetitionResponse,
        ranking::UserStanding,
        user::{CreateUserRequest, NotificationResponse, UserResponse},
    },
    error::Result,
    models::UserCompetition,
    services::ranking::RankingEngine,
};

/// List all users
pub async fn list_users(engine: &RankingEngine) -> Result<Vec<UserResponse>> {
    let users = engine.list_users().await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Create a new user
pub async fn create_user(engine: &RankingEngine, request: &CreateUserRequest) -> Result<UserResponse> {
    let user = engine
        .create_user(&request.username, &request.password)
        .await?;
    Ok(UserResponse::from(user))
}

pub async fn get_user(engine: &RankingEngine, user_id: i32) -> Result<UserResponse> {
    Ok(UserResponse::from(engine.get_user(user_id).await?))
}

/// Check credentials; `None` when they do not match
pub async fn login(engine: &RankingEngine, username: &str, password: &str) -> Result<Option<UserResponse>> {
    let user = engine.login(username, password).await?;
    Ok(user.map(UserResponse::from))
}

pub async fn get_standing(engine: &RankingEngine, user_id: i32) -> Result<UserStanding> {
    engine.user_standing(user_id).await
}

pub async fn get_rankings(engine: &RankingEngine, user_id: i32) -> Result<Vec<UserCompetition>> {
    engine.user_rankings(user_id).await
}

pub async fn get_competitions(engine: &RankingEngine, user_id: i32) -> Result<Vec<CompetitionResponse>> {
    let competitions = engine.user_competitions(user_id).await?;
    Ok(competitions
        .into_iter()
        .map(CompetitionResponse::from)
        .collect())
}

/// Read and clear the user's pending notification
pub async fn take_notification(engine: &RankingEngine, user_id: i32) -> Result<NotificationResponse> {
    let message = engine.take_notification(user_id).await?;
    Ok(NotificationResponse { user_id, message })
}
