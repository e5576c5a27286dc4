use axum::{Router, routing::get};

use super::handlers::get_overall_ranking;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/overall", get(get_overall_ranking))
}
