use std::sync::Arc;

use anyhow::Context;
use storage::{
    Database, InMemoryStore, PgStore, RecordStore,
    services::{
        notification::{
            InboxTransport, NotificationDispatcher, NotificationTransport, TracingTransport,
        },
        orchestrator::Orchestrator,
        ranking::RankingEngine,
        seed::seed,
    },
};

mod app;
mod config;
mod error;
mod features;
mod middleware;
mod state;

use config::{Config, NotificationSink};
use middleware::auth::ApiKeys;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("Starting leaderboard API");

    let config = Config::from_env().context("Failed to load API configuration")?;
    tracing::info!("Configuration loaded successfully");

    let store: Arc<dyn RecordStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!(
                "Connecting to database at: {}",
                database_url.split('@').next_back().unwrap_or("unknown")
            );
            let db = Database::new(database_url)
                .await
                .context("Failed to initialize database")?;
            tracing::info!("Database connection established");

            tracing::info!("Running database migrations");
            db.run_migrations()
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations completed successfully");

            Arc::new(PgStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, records are kept in memory only");
            Arc::new(InMemoryStore::new())
        }
    };

    let transport: Arc<dyn NotificationTransport> = match config.notification_sink {
        NotificationSink::Inbox => Arc::new(InboxTransport::new(store.clone())),
        NotificationSink::Log => Arc::new(TracingTransport),
    };

    let orchestrator = Orchestrator::new(
        RankingEngine::new(store),
        NotificationDispatcher::new(transport),
    );

    if config.seed_demo_data {
        tracing::info!("Loading demo data");
        let report = seed(&orchestrator)
            .await
            .context("Failed to load demo data")?;
        tracing::info!(
            comp_id = report.comp_id,
            changes = report.changes.changes.len(),
            notified = report.standings.notified.len(),
            "Demo data ready"
        );
    }

    let api_keys = ApiKeys::from_comma_separated(&config.api_keys);
    let app = app::router(AppState::new(orchestrator), api_keys);

    let bind_address = format!("{}:{}", config.host, config.port);
    tracing::info!("Starting server at http://{}", bind_address);
    tracing::info!(
        "OpenAPI document available at http://{}/api-docs/openapi.json",
        bind_address
    );

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    axum::serve(listener, app).await?;

    Ok(())
}
