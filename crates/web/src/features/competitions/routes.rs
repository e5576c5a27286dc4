use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use super::handlers::{
    create_competition, get_competition, get_top, list_competitions, list_participants,
    notify_all, notify_changes, register, submit_rank,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_competition))
        .route("/:comp_id/participants", post(register))
        .route("/:comp_id/participants/:user_id", put(submit_rank))
        .route("/:comp_id/leaderboard/notify-all", post(notify_all))
        .route("/:comp_id/leaderboard/notify-changes", post(notify_changes))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_competitions))
        .route("/:comp_id", get(get_competition))
        .route("/:comp_id/participants", get(list_participants))
        .route("/:comp_id/top", get(get_top))
        .merge(protected)
}
