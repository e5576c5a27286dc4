use storage::{
    dto::{
        competition::{CompetitionResponse, CreateCompetitionRequest},
        user::UserResponse,
    },
    error::Result,
    models::UserCompetition,
    services::{orchestrator::CycleReport, ranking::RankingEngine},
};

use crate::state::AppState;

/// List all competitions
pub async fn list_competitions(engine: &RankingEngine) -> Result<Vec<CompetitionResponse>> {
    let competitions = engine.list_competitions().await?;
    Ok(competitions
        .into_iter()
        .map(CompetitionResponse::from)
        .collect())
}

/// Create a new competition
pub async fn create_competition(
    engine: &RankingEngine,
    request: &CreateCompetitionRequest,
) -> Result<CompetitionResponse> {
    let competition = engine
        .create_competition(&request.name, &request.location)
        .await?;
    Ok(CompetitionResponse::from(competition))
}

pub async fn get_competition(engine: &RankingEngine, comp_id: i32) -> Result<CompetitionResponse> {
    Ok(CompetitionResponse::from(
        engine.get_competition(comp_id).await?,
    ))
}

/// Participants in registration order
pub async fn list_participants(engine: &RankingEngine, comp_id: i32) -> Result<Vec<UserResponse>> {
    let users = engine.competition_users(comp_id).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Best `limit` registrations of the competition
pub async fn top(engine: &RankingEngine, comp_id: i32, limit: usize) -> Result<Vec<UserCompetition>> {
    engine.top_n_in_competition(comp_id, limit).await
}

pub async fn register(state: &AppState, comp_id: i32, user_id: i32, rank: i32) -> Result<UserCompetition> {
    state.orchestrator.register(user_id, comp_id, rank).await
}

/// Change a rank and notify the users whose top 20 position changed
pub async fn submit_rank(state: &AppState, comp_id: i32, user_id: i32, rank: i32) -> Result<CycleReport> {
    state.orchestrator.submit_rank(user_id, comp_id, rank).await
}

pub async fn notify_all(state: &AppState, comp_id: i32) -> Result<CycleReport> {
    state.orchestrator.manage_top_20_and_notify(comp_id).await
}

pub async fn notify_changes(state: &AppState, comp_id: i32) -> Result<CycleReport> {
    state.orchestrator.update_and_notify_top_20(comp_id).await
}
