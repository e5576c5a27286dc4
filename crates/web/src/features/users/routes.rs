use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use super::handlers::{
    create_user, get_competitions, get_rankings, get_standing, get_user, list_users, login,
    take_notification,
};
use crate::middleware::auth::{ApiKeys, require_auth};
use crate::state::AppState;

pub fn routes(api_keys: ApiKeys) -> Router<AppState> {
    let protected = Router::new()
        .route("/", post(create_user))
        .route("/:user_id/notification", delete(take_notification))
        .route_layer(middleware::from_fn_with_state(api_keys, require_auth));

    Router::new()
        .route("/", get(list_users))
        .route("/login", post(login))
        .route("/:user_id", get(get_user))
        .route("/:user_id/standing", get(get_standing))
        .route("/:user_id/rankings", get(get_rankings))
        .route("/:user_id/competitions", get(get_competitions))
        .merge(protected)
}
