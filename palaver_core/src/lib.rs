#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod state;

pub use state::{DialogueState, DialogueStateTracker};

/// Which side of the conversation produced an utterance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Speaker {
    Agent,
    User,
}

impl Speaker {
    /// The opposite side of the exchange.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Agent => Self::User,
            Self::User => Self::Agent,
        }
    }
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Agent => write!(f, "AGENT"),
            Self::User => write!(f, "USER"),
        }
    }
}

/// A conversational act label, compared by label value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Intent(String);

impl Intent {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named slot filled (or mentioned) during the conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Annotation {
    pub slot: String,
    pub value: Option<String>,
}

impl Annotation {
    #[must_use]
    pub fn new(slot: impl Into<String>, value: Option<String>) -> Self {
        Self {
            slot: slot.into(),
            value,
        }
    }
}

/// One utterance in a conversation.
///
/// The id exists so out-of-band feedback can reference a produced utterance
/// later; ordering within a dialogue is positional, not timestamp-based.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Utterance {
    pub id: Uuid,
    pub text: String,
    pub intent: Option<Intent>,
    pub annotations: Vec<Annotation>,
    pub timestamp: DateTime<Utc>,
}

impl Utterance {
    /// Create a plain text utterance.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            text: text.into(),
            intent: None,
            annotations: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Attach an intent label.
    #[must_use]
    pub fn with_intent(mut self, intent: Intent) -> Self {
        self.intent = Some(intent);
        self
    }

    /// Attach slot annotations.
    #[must_use]
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Tag this utterance with the speaker that produced it.
    #[must_use]
    pub const fn tagged(self, speaker: Speaker) -> TaggedUtterance {
        TaggedUtterance {
            speaker,
            utterance: self,
        }
    }
}

/// An utterance together with the side that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaggedUtterance {
    pub speaker: Speaker,
    pub utterance: Utterance,
}

/// A participant in a dialogue.
///
/// Both agents and users are participants: either side can be the source or
/// the target of a turn. Receiving an utterance may synchronously produce the
/// next one (`Some`), or decline (`None`) when the participant has nothing to
/// say right now — a human user answers later through the transport, an agent
/// stops on an end-of-dialogue act.
#[async_trait]
pub trait Participant: Send + Sync {
    fn id(&self) -> &str;

    fn speaker(&self) -> Speaker;

    async fn receive_utterance(
        &self,
        utterance: &TaggedUtterance,
    ) -> anyhow::Result<Option<Utterance>>;
}

/// Seam to the external language model that produces agent utterances.
///
/// Intent and slot extraction happen behind this trait; the dialogue core
/// only moves the produced utterances around.
#[async_trait]
pub trait DialoguePolicy: Send + Sync {
    /// The utterance that opens a conversation.
    async fn opening(&self) -> anyhow::Result<Utterance>;

    /// React to the other participant. `None` ends the exchange.
    async fn respond(&self, utterance: &TaggedUtterance) -> anyhow::Result<Option<Utterance>>;
}
