use axum::{Json, Router, routing::get};
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;

use crate::features::{competitions, rankings, users};
use crate::middleware::auth::ApiKeys;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        users::handlers::list_users,
        users::handlers::create_user,
        users::handlers::login,
        users::handlers::get_user,
        users::handlers::get_standing,
        users::handlers::get_rankings,
        users::handlers::get_competitions,
        users::handlers::take_notification,
        competitions::handlers::list_competitions,
        competitions::handlers::create_competition,
        competitions::handlers::get_competition,
        competitions::handlers::list_participants,
        competitions::handlers::get_top,
        competitions::handlers::register,
        competitions::handlers::submit_rank,
        competitions::handlers::notify_all,
        competitions::handlers::notify_changes,
        rankings::handlers::get_overall_ranking,
    ),
    components(
        schemas(
            storage::dto::user::CreateUserRequest,
            storage::dto::user::UserResponse,
            storage::dto::user::NotificationResponse,
            storage::dto::competition::CreateCompetitionRequest,
            storage::dto::competition::RegisterRequest,
            storage::dto::competition::UpdateRankRequest,
            storage::dto::competition::CompetitionResponse,
            storage::dto::ranking::UserStanding,
            storage::dto::ranking::OverallRankingEntry,
            storage::models::Competition,
            storage::models::UserCompetition,
            storage::models::LeaderboardEntry,
            storage::models::LeaderboardSnapshot,
            storage::services::leaderboard::LeaderboardChange,
            storage::services::orchestrator::CycleReport,
        )
    ),
    tags(
        (name = "users", description = "User endpoints"),
        (name = "competitions", description = "Competition and registration endpoints"),
        (name = "leaderboard", description = "Top 20 notification cycles"),
        (name = "rankings", description = "Overall ranking endpoints"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("API Key")
                        .build(),
                ),
            )
        }
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn router(state: AppState, api_keys: ApiKeys) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .nest("/users", users::routes::routes(api_keys.clone()))
        .nest("/competitions", competitions::routes::routes(api_keys))
        .nest("/rankings", rankings::routes::routes());

    Router::new()
        .nest("/api", api)
        .route("/api-docs/openapi.json", get(openapi_json))
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use storage::{
        InMemoryStore, RecordStore,
        services::{
            notification::{InboxTransport, NotificationDispatcher},
            orchestrator::Orchestrator,
            ranking::RankingEngine,
        },
    };
    use tower::ServiceExt;

    use super::*;

    const KEY: &str = "test-key";

    fn app() -> Router {
        let store: Arc<dyn RecordStore> = Arc::new(InMemoryStore::new());
        let orchestrator = Orchestrator::new(
            RankingEngine::new(store.clone()),
            NotificationDispatcher::new(Arc::new(InboxTransport::new(store))),
        );
        router(
            AppState::new(orchestrator),
            ApiKeys::from_comma_separated(KEY),
        )
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", KEY));
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn test_mutations_require_api_key() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/competitions")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"name": "Walktime", "location": "Port of Spain"}).to_string(),
            ))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_notify_all_right_after_registration() {
        let app = app();
        for username in ["bob", "rick"] {
            send(
                &app,
                "POST",
                "/api/users",
                Some(json!({"username": username, "password": "bobpass"})),
            )
            .await;
        }
        send(
            &app,
            "POST",
            "/api/competitions",
            Some(json!({"name": "Walktime", "location": "Port of Spain"})),
        )
        .await;
        for (user_id, rank) in [(1, 2), (2, 1)] {
            send(
                &app,
                "POST",
                "/api/competitions/1/participants",
                Some(json!({"user_id": user_id, "rank": rank})),
            )
            .await;
        }

        let (status, report) =
            send(&app, "POST", "/api/competitions/1/leaderboard/notify-all", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["notified"], json!([2, 1]));

        let (_, notification) = send(&app, "DELETE", "/api/users/1/notification", None).await;
        assert_eq!(
            notification["message"],
            "you are positioned 2 in the top 20 overall rank!"
        );
    }

    #[tokio::test]
    async fn test_registration_flow() {
        let app = app();

        let (status, user) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({"username": "bob", "password": "bobpass"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(user["username"], "bob");
        assert!(user.get("password").is_none());

        let (status, _) = send(
            &app,
            "POST",
            "/api/competitions",
            Some(json!({"name": "Walktime", "location": "Port of Spain"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, record) = send(
            &app,
            "POST",
            "/api/competitions/1/participants",
            Some(json!({"user_id": 1, "rank": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(record["rank"], 4);

        let (status, body) = send(
            &app,
            "POST",
            "/api/competitions/1/participants",
            Some(json!({"user_id": 1, "rank": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("already registered"));

        let (status, _) = send(
            &app,
            "POST",
            "/api/competitions/1/participants",
            Some(json!({"user_id": 9, "rank": 4})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, rankings) = send(&app, "GET", "/api/users/1/rankings", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rankings[0]["comp_id"], 1);
        assert_eq!(rankings[0]["rank"], 4);

        let (_, competitions) = send(&app, "GET", "/api/users/1/competitions", None).await;
        assert_eq!(competitions[0]["name"], "Walktime");
    }

    #[tokio::test]
    async fn test_rank_update_notifies_through_inbox() {
        let app = app();
        for username in ["bob", "rick"] {
            send(
                &app,
                "POST",
                "/api/users",
                Some(json!({"username": username, "password": "pass"})),
            )
            .await;
        }
        send(
            &app,
            "POST",
            "/api/competitions",
            Some(json!({"name": "theboys", "location": "sando"})),
        )
        .await;
        for (user_id, rank) in [(1, 1), (2, 2)] {
            send(
                &app,
                "POST",
                "/api/competitions/1/participants",
                Some(json!({"user_id": user_id, "rank": rank})),
            )
            .await;
        }

        let (status, report) = send(
            &app,
            "POST",
            "/api/competitions/1/leaderboard/notify-changes",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["notified"], json!([]));

        let (status, report) = send(
            &app,
            "PUT",
            "/api/competitions/1/participants/2",
            Some(json!({"rank": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["notified"], json!([1, 2]));

        let (_, notification) = send(&app, "DELETE", "/api/users/1/notification", None).await;
        assert_eq!(
            notification["message"],
            "your position changed from 1 to 2 in the top 20 overall rank!"
        );
        let (_, notification) = send(&app, "DELETE", "/api/users/1/notification", None).await;
        assert_eq!(notification["message"], Value::Null);

        let (_, standing) = send(&app, "GET", "/api/users/2/standing", None).await;
        assert_eq!(standing["position"], 1);
        assert_eq!(standing["overall_rank"], 0);

        let (_, overall) = send(&app, "GET", "/api/rankings/overall", None).await;
        assert_eq!(overall[0]["username"], "rick");
        assert_eq!(overall[1]["position"], 2);
    }

    #[tokio::test]
    async fn test_top_limit_is_bounded() {
        let app = app();
        send(
            &app,
            "POST",
            "/api/competitions",
            Some(json!({"name": "theboys", "location": "sando"})),
        )
        .await;

        let (status, _) = send(&app, "GET", "/api/competitions/1/top?limit=21", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, top) = send(&app, "GET", "/api/competitions/1/top", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(top, json!([]));

        let (status, _) = send(&app, "GET", "/api/competitions/2/top", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = app();
        let (status, body) = send(
            &app,
            "POST",
            "/api/users",
            Some(json!({"username": "", "password": "pass"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Validation failed");
    }

    #[tokio::test]
    async fn test_openapi_document_served() {
        let app = app();
        let (status, doc) = send(&app, "GET", "/api-docs/openapi.json", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(doc["paths"]["/api/rankings/overall"].is_object());
    }
}
