use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::store::RecordStore;

use super::leaderboard::{LeaderboardChange, REMOVED_POSITION};

#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification delivery to user {user_id} failed: {reason}")]
    DeliveryFailure { user_id: i32, reason: String },
}

/// Fire-and-forget delivery of a text body to a user
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    async fn send(&self, user_id: i32, text: &str) -> Result<(), NotificationError>;
}

/// Transport that only writes deliveries to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTransport;

#[async_trait]
impl NotificationTransport for TracingTransport {
    async fn send(&self, user_id: i32, text: &str) -> Result<(), NotificationError> {
        tracing::info!(user_id, message = text, "Notification sent");
        Ok(())
    }
}

/// Transport storing the message as the user's pending notification,
/// replacing any unread one
#[derive(Clone)]
pub struct InboxTransport {
    store: Arc<dyn RecordStore>,
}

impl InboxTransport {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl NotificationTransport for InboxTransport {
    async fn send(&self, user_id: i32, text: &str) -> Result<(), NotificationError> {
        self.store
            .set_notification(user_id, Some(text.to_string()))
            .await
            .map(|_| ())
            .map_err(|e| NotificationError::DeliveryFailure {
                user_id,
                reason: e.to_string(),
            })
    }
}

pub fn moved_message(from: u32, to: u32) -> String {
    format!("your position changed from {from} to {to} in the top 20 overall rank!")
}

pub fn removed_message() -> String {
    format!(
        "you've been removed from the top 20 overall rank and now positioned as {REMOVED_POSITION}."
    )
}

pub fn standing_message(position: u32) -> String {
    format!("you are positioned {position} in the top 20 overall rank!")
}

/// Formats messages and hands them to the transport, logging and
/// absorbing delivery failures
#[derive(Clone)]
pub struct NotificationDispatcher {
    transport: Arc<dyn NotificationTransport>,
}

impl NotificationDispatcher {
    pub fn new(transport: Arc<dyn NotificationTransport>) -> Self {
        Self { transport }
    }

    /// Returns whether the transport accepted the message
    pub async fn notify(&self, user_id: i32, message: &str) -> bool {
        match self.transport.send(user_id, message).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(user_id, error = %e, "Notification dropped");
                false
            }
        }
    }

    /// Notify the user behind a leaderboard change, `None` for entries
    /// which are never notified
    pub async fn notify_change(&self, change: &LeaderboardChange) -> Option<bool> {
        let message = match *change {
            LeaderboardChange::Moved { from, to, .. } => moved_message(from, to),
            LeaderboardChange::Removed { .. } => removed_message(),
            LeaderboardChange::Entered { .. } => return None,
        };

        Some(self.notify(change.user_id(), &message).await)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Mutex;

    use super::*;

    /// Records every delivery, failing for users listed in `failing`
    #[derive(Default)]
    pub struct RecordingTransport {
        pub sent: Mutex<Vec<(i32, String)>>,
        pub failing: Vec<i32>,
    }

    impl RecordingTransport {
        pub fn failing_for(failing: Vec<i32>) -> Self {
            Self {
                sent: Mutex::default(),
                failing,
            }
        }

        pub fn sent(&self) -> Vec<(i32, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl NotificationTransport for RecordingTransport {
        async fn send(&self, user_id: i32, text: &str) -> Result<(), NotificationError> {
            if self.failing.contains(&user_id) {
                return Err(NotificationError::DeliveryFailure {
                    user_id,
                    reason: "unreachable".to_string(),
                });
            }
            self.sent.lock().unwrap().push((user_id, text.to_string()));
            Ok(())
        }
    }
}
