//! Terminal conversation command.
//!
//! Runs one session end to end through the registry: the terminal is the
//! transport, stdin messages are routed as user utterances and agent
//! utterances are printed as they are displayed.

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use async_trait::async_trait;
use palaver_config::{Config, DialogueConfig};
use palaver_conversation::{InMemoryFeedbackStore, UtteranceDisplay};
use palaver_core::{DialoguePolicy, Intent, TaggedUtterance, Utterance};
use palaver_platform::{DialogueSettings, PolicyAgentBuilder, SessionRegistry};
use tracing::{info, warn};

/// Input parameters for the Chat command strategy.
#[derive(Debug, Clone)]
pub struct ChatInput {
    /// Connection id registered for this terminal.
    pub session_id: String,
}

/// Prints agent utterances to the terminal.
///
/// User utterances are not re-echoed; the human just typed them.
struct TerminalDisplay;

impl UtteranceDisplay for TerminalDisplay {
    fn display_agent_utterance(&self, _session_id: &str, utterance: &TaggedUtterance) {
        println!("\n{}\n", utterance.utterance.text);
    }

    fn display_user_utterance(&self, _session_id: &str, _utterance: &TaggedUtterance) {}
}

/// Stand-in dialogue policy so the platform can be exercised without a
/// language model: it greets, acknowledges by echoing, and stops once the
/// user says goodbye.
struct EchoPolicy;

#[async_trait]
impl DialoguePolicy for EchoPolicy {
    async fn opening(&self) -> anyhow::Result<Utterance> {
        Ok(
            Utterance::text("Hello! I will echo whatever you tell me. Say 'bye' when done.")
                .with_intent(Intent::new("greeting")),
        )
    }

    async fn respond(&self, utterance: &TaggedUtterance) -> anyhow::Result<Option<Utterance>> {
        let text = utterance.utterance.text.trim();
        if text.eq_ignore_ascii_case("bye") {
            return Ok(Some(
                Utterance::text("Goodbye!").with_intent(Intent::new("closing")),
            ));
        }
        Ok(Some(Utterance::text(format!("You said: {text}"))))
    }
}

/// Strategy for executing the Chat command.
#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = ChatInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let dialogue = Config::load().map_or_else(
            |e| {
                warn!("No usable config ({e}), using dialogue defaults");
                DialogueConfig::default()
            },
            |config| config.dialogue,
        );

        let registry = SessionRegistry::new(
            Arc::new(TerminalDisplay),
            Arc::new(PolicyAgentBuilder::new(Arc::new(EchoPolicy))),
            Arc::new(InMemoryFeedbackStore::new()),
            DialogueSettings {
                max_exchange_hops: dialogue.max_exchange_hops,
            },
        );

        let session_id = input.session_id;
        info!("Connecting terminal session: {session_id}");
        registry.connect(&session_id).await?;

        println!("Type 'exit', 'quit' or Ctrl+C to end the session.");

        loop {
            print!("> ");
            std::io::stdout().flush()?;

            let mut line = String::new();
            std::io::stdin().read_line(&mut line)?;
            let line = line.trim();

            if matches!(line, "exit" | "quit" | "q") {
                break;
            }

            if line.is_empty() {
                continue;
            }

            registry.message(&session_id, line, &HashMap::new()).await?;
        }

        let connector = registry.connector(&session_id).await?;
        {
            let connector = connector.lock().await;
            let state = connector.state();
            println!(
                "\nSession ended. {} turns, {} utterances.",
                state.turn_count,
                state.history.len()
            );
        }

        registry.disconnect(&session_id).await?;
        Ok(())
    }
}
