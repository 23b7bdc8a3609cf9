//! Batch evaluation command.

use std::path::PathBuf;

use palaver_eval::{Evaluator, SatisfactionClassifier, load_dialogues};
use tracing::info;

/// Input parameters for the Eval command strategy.
#[derive(Debug, Clone)]
pub struct EvalInput {
    /// Path to the dialogue log.
    pub dialogues: PathBuf,
    /// Optional config file path overriding the default location.
    pub config: Option<PathBuf>,
    /// Whether to also run the satisfaction scorer.
    pub satisfaction: bool,
}

/// Keyword stand-in for an external satisfaction model.
///
/// Scores from a neutral 3, nudged by how the conversation reads.
struct KeywordClassifier;

impl SatisfactionClassifier for KeywordClassifier {
    fn classify(&self, conversation: &str) -> anyhow::Result<i32> {
        let lower = conversation.to_lowercase();
        let mut score = 3;
        if ["thanks", "thank you", "great", "perfect"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            score += 1;
        }
        if ["wrong", "useless", "terrible", "not what i"]
            .iter()
            .any(|needle| lower.contains(needle))
        {
            score -= 1;
        }
        Ok(score.clamp(1, 5))
    }
}

/// Strategy for executing the Eval command.
#[derive(Debug, Clone, Copy)]
pub struct EvalStrategy;

impl super::CommandStrategy for EvalStrategy {
    type Input = EvalInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = super::load_config(input.config.as_deref())?;
        let dialogues = load_dialogues(&input.dialogues)?;
        info!("Scoring {} dialogues", dialogues.len());

        let evaluator = Evaluator::new(dialogues, config.evaluation.reward);

        println!("Average turns: {:.2}", evaluator.avg_turns());

        let stats = evaluator.user_act_ratio();
        let mut keys: Vec<&String> = stats.keys().collect();
        keys.sort();
        println!("Participant activity:");
        for key in keys {
            println!("  {key}: {:.4}", stats[key]);
        }

        let report = evaluator.reward();
        println!("Rewards (avg {:.2}):", report.avg_reward);
        for (i, entry) in report.dialogues.iter().enumerate() {
            println!(
                "  dialogue {i}: reward {:.2} (intents {:.1}, repeats -{:.1}, turns -{:.1})",
                entry.reward, entry.intent_points, entry.repeat_penalties, entry.turn_costs
            );
        }

        if input.satisfaction {
            let scores = evaluator.satisfaction(&KeywordClassifier)?;
            println!("Satisfaction: {scores:?}");
        }

        Ok(())
    }
}
