use anyhow::{Context, Result, bail};

/// Where leaderboard notifications are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSink {
    /// Stored as the user's pending notification
    Inbox,
    /// Written to the log only
    Log,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when unset
    pub database_url: Option<String>,
    pub api_keys: String,
    pub notification_sink: NotificationSink,
    pub seed_demo_data: bool,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            host: std::env::var("HOST").context("Cannot load HOST env variable")?,
            port: std::env::var("PORT")
                .context("Cannot load PORT env variable")?
                .parse()
                .context("PORT must be a number")?,
            database_url: std::env::var("DATABASE_URL").ok(),
            api_keys: std::env::var("API_KEYS").unwrap_or_default(),
            notification_sink: parse_sink(
                &std::env::var("NOTIFICATION_SINK").unwrap_or_else(|_| "inbox".to_string()),
            )?,
            seed_demo_data: std::env::var("SEED_DEMO_DATA")
                .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        })
    }
}

fn parse_sink(value: &str) -> Result<NotificationSink> {
    match value.to_ascii_lowercase().as_str() {
        "inbox" => Ok(NotificationSink::Inbox),
        "log" => Ok(NotificationSink::Log),
        other => bail!("NOTIFICATION_SINK must be 'inbox' or 'log', got '{}'", other),
    }
}
