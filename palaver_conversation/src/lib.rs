#![warn(
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

//! Turn exchange for one live conversation.
//!
//! The [`DialogueConnector`] drives a single session: it folds every
//! utterance into the dialogue state, hands it to the display seam and
//! delivers it to the other participant, which may synchronously produce the
//! next utterance. The exchange is an explicit bounded loop, not recursion,
//! so pathological agent/user chains cannot grow the stack.

mod agent;
mod connector;
mod feedback;
mod user;

pub use agent::Agent;
pub use connector::{ConnectorStatus, DialogueConnector, Error, Result};
pub use feedback::{Feedback, FeedbackStore, InMemoryFeedbackStore};
pub use user::User;

use palaver_core::TaggedUtterance;

/// Outbound display seam.
///
/// The transport layer implements this to push utterances to whatever is
/// showing the conversation; the connector calls it after each state update.
pub trait UtteranceDisplay: Send + Sync {
    fn display_agent_utterance(&self, session_id: &str, utterance: &TaggedUtterance);

    fn display_user_utterance(&self, session_id: &str, utterance: &TaggedUtterance);
}
