//! The human side of a conversation.

use std::collections::HashMap;

use async_trait::async_trait;
use palaver_core::{Annotation, Intent, Participant, Speaker, TaggedUtterance, Utterance};
use tracing::debug;

/// A user participant.
///
/// The human never replies synchronously — their next message arrives later
/// through the transport — so `receive_utterance` always declines. What the
/// user contributes is [`User::compose`], which turns raw transport input
/// into an utterance.
pub struct User {
    id: String,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Build an utterance from transport input.
    ///
    /// Metadata may carry pre-extracted understanding results: an `"intent"`
    /// string and an `"annotations"` list of `{slot, value}` objects. They
    /// are produced upstream; nothing is parsed out of the text here.
    #[must_use]
    pub fn compose(
        &self,
        text: &str,
        metadata: &HashMap<String, serde_json::Value>,
    ) -> Utterance {
        let mut utterance = Utterance::text(text);

        if let Some(label) = metadata.get("intent").and_then(serde_json::Value::as_str) {
            utterance = utterance.with_intent(Intent::new(label));
        }

        if let Some(value) = metadata.get("annotations") {
            let annotations: Vec<Annotation> =
                serde_json::from_value(value.clone()).unwrap_or_default();
            if !annotations.is_empty() {
                debug!(
                    "user {} composed utterance with {} annotations",
                    self.id,
                    annotations.len()
                );
                utterance = utterance.with_annotations(annotations);
            }
        }

        utterance
    }
}

#[async_trait]
impl Participant for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn speaker(&self) -> Speaker {
        Speaker::User
    }

    async fn receive_utterance(
        &self,
        _utterance: &TaggedUtterance,
    ) -> anyhow::Result<Option<Utterance>> {
        Ok(None)
    }
}
