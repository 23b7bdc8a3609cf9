//! Template extraction command.

use std::path::PathBuf;

use palaver_eval::load_dialogues;
use palaver_eval::templates::extract_templates;
use tracing::info;

/// Input parameters for the Templates command strategy.
#[derive(Debug, Clone)]
pub struct TemplatesInput {
    /// Path to the dialogue log.
    pub dialogues: PathBuf,
}

/// Strategy for executing the Templates command.
#[derive(Debug, Clone, Copy)]
pub struct TemplatesStrategy;

impl super::CommandStrategy for TemplatesStrategy {
    type Input = TemplatesInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let dialogues = load_dialogues(&input.dialogues)?;
        let templates = extract_templates(&dialogues);
        info!("Extracted templates for {} intents", templates.len());

        let mut intents: Vec<&String> = templates.keys().collect();
        intents.sort();
        for intent in intents {
            println!("{intent}:");
            for template in &templates[intent] {
                println!("  {template}");
            }
        }

        Ok(())
    }
}
