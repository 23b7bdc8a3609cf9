//! Per-session dialogue connector state machine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use palaver_core::{DialogueState, DialogueStateTracker, Participant, Speaker, TaggedUtterance};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{Agent, Feedback, FeedbackStore, UtteranceDisplay};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("session {0} is closed")]
    SessionClosed(String),

    #[error("session {0} has not been started")]
    NotStarted(String),

    #[error("session {0} is already active")]
    AlreadyStarted(String),

    #[error("dialogue policy error: {0}")]
    Policy(#[source] anyhow::Error),

    #[error("feedback store error: {0}")]
    Feedback(#[source] anyhow::Error),
}

/// Lifecycle of a connector. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectorStatus {
    Created,
    Active,
    Closed,
}

/// Drives the turn exchange of one session.
///
/// One inbound event at a time: the owner serializes calls (the registry
/// wraps the connector in a mutex), which is what keeps the history
/// append-order invariant intact. The cancellation flag is shared with the
/// owner so a disconnect can abandon an in-flight exchange at its next
/// utterance boundary instead of waiting for it to finish.
///
/// The user side is any [`Participant`]: a human bridged over the transport
/// never replies synchronously, while a simulated user may answer every
/// agent utterance — which is exactly the chain the hop bound exists for.
pub struct DialogueConnector {
    session_id: String,
    agent: Arc<Agent>,
    user: Arc<dyn Participant>,
    tracker: DialogueStateTracker,
    status: ConnectorStatus,
    display: Arc<dyn UtteranceDisplay>,
    feedback: Arc<dyn FeedbackStore>,
    cancel: Arc<AtomicBool>,
    max_exchange_hops: usize,
}

impl DialogueConnector {
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        agent: Arc<Agent>,
        user: Arc<dyn Participant>,
        display: Arc<dyn UtteranceDisplay>,
        feedback: Arc<dyn FeedbackStore>,
        max_exchange_hops: usize,
    ) -> Self {
        Self {
            session_id: session_id.into(),
            agent,
            user,
            tracker: DialogueStateTracker::new(),
            status: ConnectorStatus::Created,
            display,
            feedback,
            cancel: Arc::new(AtomicBool::new(false)),
            max_exchange_hops,
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub const fn status(&self) -> ConnectorStatus {
        self.status
    }

    /// The dialogue state accumulated so far.
    #[must_use]
    pub const fn state(&self) -> &DialogueState {
        self.tracker.state()
    }

    /// Handle shared with the owner; storing `true` abandons the in-flight
    /// exchange at its next utterance boundary.
    #[must_use]
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Activate the session and let the agent open the conversation.
    pub async fn start(&mut self) -> Result<()> {
        match self.status {
            ConnectorStatus::Closed => {
                return Err(Error::SessionClosed(self.session_id.clone()));
            }
            ConnectorStatus::Active => {
                return Err(Error::AlreadyStarted(self.session_id.clone()));
            }
            ConnectorStatus::Created => {}
        }

        self.status = ConnectorStatus::Active;
        info!("session {} active", self.session_id);

        let opening = self.agent.opening().await.map_err(Error::Policy)?;
        self.exchange(opening.tagged(Speaker::Agent)).await
    }

    /// Run one inbound utterance through the exchange loop.
    pub async fn process(&mut self, utterance: TaggedUtterance) -> Result<()> {
        match self.status {
            ConnectorStatus::Created => {
                return Err(Error::NotStarted(self.session_id.clone()));
            }
            ConnectorStatus::Closed => {
                return Err(Error::SessionClosed(self.session_id.clone()));
            }
            ConnectorStatus::Active => {}
        }
        self.exchange(utterance).await
    }

    /// Record a rating for a previously produced utterance.
    ///
    /// Dialogue state is untouched; the rating goes to the feedback store.
    pub async fn handle_feedback(&self, feedback: Feedback) -> Result<()> {
        if self.status == ConnectorStatus::Closed {
            return Err(Error::SessionClosed(self.session_id.clone()));
        }
        debug!(
            "session {}: feedback {} for utterance {}",
            self.session_id, feedback.value, feedback.utterance_id
        );
        self.feedback
            .record(&self.session_id, feedback)
            .await
            .map_err(Error::Feedback)
    }

    /// Close the session. Idempotent, callable from any state.
    pub fn close(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if self.status != ConnectorStatus::Closed {
            self.status = ConnectorStatus::Closed;
            info!("session {} closed", self.session_id);
        }
    }

    /// Deliver utterances back and forth until one side declines.
    ///
    /// Each delivered utterance is appended to the state, displayed, and
    /// handed to the other participant, whose reply (if any) feeds the next
    /// iteration. The hop bound cuts off agent/user pairs that would answer
    /// each other forever.
    async fn exchange(&mut self, utterance: TaggedUtterance) -> Result<()> {
        let mut current = utterance;

        for _ in 0..self.max_exchange_hops {
            self.checkpoint()?;

            self.tracker.update(current.clone());
            match current.speaker {
                Speaker::Agent => self
                    .display
                    .display_agent_utterance(&self.session_id, &current),
                Speaker::User => self
                    .display
                    .display_user_utterance(&self.session_id, &current),
            }

            let recipient: &dyn Participant = match current.speaker {
                Speaker::Agent => self.user.as_ref(),
                Speaker::User => self.agent.as_ref(),
            };

            let Some(reply) = recipient
                .receive_utterance(&current)
                .await
                .map_err(Error::Policy)?
            else {
                return Ok(());
            };

            current = reply.tagged(recipient.speaker());
        }

        warn!(
            "session {}: exchange cut off after {} hops",
            self.session_id, self.max_exchange_hops
        );
        Ok(())
    }

    /// Utterance-boundary check; a tripped cancellation flag closes the
    /// session before any further state mutation.
    fn checkpoint(&mut self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) || self.status == ConnectorStatus::Closed {
            self.close();
            return Err(Error::SessionClosed(self.session_id.clone()));
        }
        Ok(())
    }
}
