//! The process-wide session table.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use palaver_core::{DialoguePolicy, Participant, Speaker};
use palaver_conversation::{
    Agent, DialogueConnector, Feedback, FeedbackStore, User, UtteranceDisplay,
};
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{Error, Result};

/// Per-conversation tuning.
#[derive(Debug, Clone)]
pub struct DialogueSettings {
    /// Upper bound on back-and-forth deliveries triggered by one inbound
    /// event.
    pub max_exchange_hops: usize,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        Self {
            max_exchange_hops: 10,
        }
    }
}

/// Constructs a fresh agent bound to a session.
pub trait AgentBuilder: Send + Sync {
    fn build(&self, session_id: &str) -> Agent;
}

/// Builds agents that share one dialogue policy.
pub struct PolicyAgentBuilder {
    policy: Arc<dyn DialoguePolicy>,
}

impl PolicyAgentBuilder {
    #[must_use]
    pub fn new(policy: Arc<dyn DialoguePolicy>) -> Self {
        Self { policy }
    }
}

impl AgentBuilder for PolicyAgentBuilder {
    fn build(&self, session_id: &str) -> Agent {
        Agent::new(format!("agent:{session_id}"), Arc::clone(&self.policy))
    }
}

/// One live conversation: its participants, its connector and the flag that
/// abandons an in-flight turn on disconnect.
#[derive(Clone)]
struct Session {
    agent: Arc<Agent>,
    user: Arc<User>,
    connector: Arc<Mutex<DialogueConnector>>,
    cancel: Arc<AtomicBool>,
}

/// Admits and retires sessions and routes inbound events to them.
pub struct SessionRegistry {
    display: Arc<dyn UtteranceDisplay>,
    agents: Arc<dyn AgentBuilder>,
    feedback: Arc<dyn FeedbackStore>,
    settings: DialogueSettings,
    sessions: Arc<Mutex<HashMap<String, Session>>>,
}

impl SessionRegistry {
    #[must_use]
    pub fn new(
        display: Arc<dyn UtteranceDisplay>,
        agents: Arc<dyn AgentBuilder>,
        feedback: Arc<dyn FeedbackStore>,
        settings: DialogueSettings,
    ) -> Self {
        Self {
            display,
            agents,
            feedback,
            settings,
            sessions: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Admit a new session and start its conversation.
    ///
    /// The agent produces the opening utterance as part of the call. When
    /// starting fails the entry is removed again, so a failed connect never
    /// leaves a partial session behind.
    pub async fn connect(&self, session_id: &str) -> Result<()> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            if sessions.contains_key(session_id) {
                return Err(Error::DuplicateSession(session_id.to_string()));
            }

            let agent = Arc::new(self.agents.build(session_id));
            let user = Arc::new(User::new(format!("user:{session_id}")));
            let user_participant: Arc<dyn Participant> = Arc::clone(&user) as Arc<dyn Participant>;
            let connector = DialogueConnector::new(
                session_id,
                Arc::clone(&agent),
                user_participant,
                Arc::clone(&self.display),
                Arc::clone(&self.feedback),
                self.settings.max_exchange_hops,
            );
            let cancel = connector.cancel_flag();

            let session = Session {
                agent,
                user,
                connector: Arc::new(Mutex::new(connector)),
                cancel,
            };
            sessions.insert(session_id.to_string(), session.clone());
            session
        };

        info!("session connected: {session_id}");

        let started = session.connector.lock().await.start().await;
        if let Err(e) = started {
            warn!("session {session_id} failed to start: {e}");
            self.sessions.lock().await.remove(session_id);
            return Err(e.into());
        }

        Ok(())
    }

    /// Retire a session.
    ///
    /// An in-flight turn is abandoned at its next utterance boundary; the
    /// connector is closed once the turn has let go of it.
    pub async fn disconnect(&self, session_id: &str) -> Result<()> {
        let session = {
            let mut sessions = self.sessions.lock().await;
            sessions
                .remove(session_id)
                .ok_or_else(|| Error::UnknownSession(session_id.to_string()))?
        };

        session.cancel.store(true, Ordering::SeqCst);
        session.connector.lock().await.close();
        info!("session disconnected: {session_id}");
        Ok(())
    }

    /// Route a user message into its session.
    pub async fn message(
        &self,
        session_id: &str,
        text: &str,
        metadata: &HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let session = self.lookup(session_id).await?;

        let utterance = session.user.compose(text, metadata);
        let tagged = utterance.tagged(Speaker::User);

        session.connector.lock().await.process(tagged).await?;
        Ok(())
    }

    /// Route a rating for a previously produced utterance into its session.
    pub async fn feedback(&self, session_id: &str, utterance_id: Uuid, value: i32) -> Result<()> {
        let session = self.lookup(session_id).await?;
        session
            .connector
            .lock()
            .await
            .handle_feedback(Feedback::new(utterance_id, value))
            .await?;
        Ok(())
    }

    /// The session's agent, for collaborators acting on a live conversation.
    pub async fn agent(&self, session_id: &str) -> Result<Arc<Agent>> {
        Ok(self.lookup(session_id).await?.agent)
    }

    /// The session's user.
    pub async fn user(&self, session_id: &str) -> Result<Arc<User>> {
        Ok(self.lookup(session_id).await?.user)
    }

    /// The session's connector.
    pub async fn connector(&self, session_id: &str) -> Result<Arc<Mutex<DialogueConnector>>> {
        Ok(self.lookup(session_id).await?.connector)
    }

    /// Number of currently registered sessions.
    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    async fn lookup(&self, session_id: &str) -> Result<Session> {
        let sessions = self.sessions.lock().await;
        sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::UnknownSession(session_id.to_string()))
    }
}

impl Clone for SessionRegistry {
    fn clone(&self) -> Self {
        Self {
            display: Arc::clone(&self.display),
            agents: Arc::clone(&self.agents),
            feedback: Arc::clone(&self.feedback),
            settings: self.settings.clone(),
            sessions: Arc::clone(&self.sessions),
        }
    }
}
