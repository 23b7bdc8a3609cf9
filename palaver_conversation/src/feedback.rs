//! Out-of-band utterance ratings.
//!
//! Feedback never touches dialogue state; it lands in a separate store the
//! embedding application provides. The in-memory implementation covers tests
//! and the terminal demo.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A scalar rating for one previously produced utterance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Feedback {
    pub utterance_id: Uuid,
    pub value: i32,
    pub received_at: DateTime<Utc>,
}

impl Feedback {
    #[must_use]
    pub fn new(utterance_id: Uuid, value: i32) -> Self {
        Self {
            utterance_id,
            value,
            received_at: Utc::now(),
        }
    }
}

/// Sink for utterance feedback, keyed by session.
#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn record(&self, session_id: &str, feedback: Feedback) -> anyhow::Result<()>;
}

/// Feedback store backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackStore {
    entries: Mutex<HashMap<String, Vec<Feedback>>>,
}

impl InMemoryFeedbackStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All feedback recorded for a session, in arrival order.
    pub async fn for_session(&self, session_id: &str) -> Vec<Feedback> {
        let entries = self.entries.lock().await;
        entries.get(session_id).cloned().unwrap_or_default()
    }
}

#[async_trait]
impl FeedbackStore for InMemoryFeedbackStore {
    async fn record(&self, session_id: &str, feedback: Feedback) -> anyhow::Result<()> {
        let mut entries = self.entries.lock().await;
        entries
            .entry(session_id.to_string())
            .or_default()
            .push(feedback);
        Ok(())
    }
}
