//! The automated side of a conversation.

use std::sync::Arc;

use async_trait::async_trait;
use palaver_core::{DialoguePolicy, Participant, Speaker, TaggedUtterance, Utterance};

/// An agent participant.
///
/// All language behavior lives behind the injected [`DialoguePolicy`]; the
/// agent itself only carries identity and routes utterances through it.
pub struct Agent {
    id: String,
    policy: Arc<dyn DialoguePolicy>,
}

impl Agent {
    #[must_use]
    pub fn new(id: impl Into<String>, policy: Arc<dyn DialoguePolicy>) -> Self {
        Self {
            id: id.into(),
            policy,
        }
    }

    /// Ask the policy for the utterance that opens the conversation.
    pub async fn opening(&self) -> anyhow::Result<Utterance> {
        self.policy.opening().await
    }
}

#[async_trait]
impl Participant for Agent {
    fn id(&self) -> &str {
        &self.id
    }

    fn speaker(&self) -> Speaker {
        Speaker::Agent
    }

    async fn receive_utterance(
        &self,
        utterance: &TaggedUtterance,
    ) -> anyhow::Result<Option<Utterance>> {
        self.policy.respond(utterance).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palaver_core::Intent;

    struct GoodbyePolicy;

    #[async_trait]
    impl DialoguePolicy for GoodbyePolicy {
        async fn opening(&self) -> anyhow::Result<Utterance> {
            Ok(Utterance::text("Hello!").with_intent(Intent::new("greeting")))
        }

        async fn respond(&self, utterance: &TaggedUtterance) -> anyhow::Result<Option<Utterance>> {
            if utterance.utterance.intent == Some(Intent::new("goodbye")) {
                return Ok(None);
            }
            Ok(Some(Utterance::text("Tell me more.")))
        }
    }

    #[tokio::test]
    async fn test_agent_delegates_to_policy() {
        let agent = Agent::new("agent:test", Arc::new(GoodbyePolicy));
        assert_eq!(agent.speaker(), Speaker::Agent);

        let opening = agent.opening().await.map_or_else(|_| String::new(), |u| u.text);
        assert_eq!(opening, "Hello!");

        let question = Utterance::text("What do you recommend?").tagged(Speaker::User);
        let reply = agent.receive_utterance(&question).await.ok().flatten();
        assert!(reply.is_some());

        let farewell = Utterance::text("bye")
            .with_intent(Intent::new("goodbye"))
            .tagged(Speaker::User);
        let reply = agent.receive_utterance(&farewell).await.ok().flatten();
        assert!(reply.is_none());
    }
}
