//! Reward configuration and report types.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::EvalError;

/// Tunable weights translating intent coverage, repetition and dialogue
/// length into a score. Every field is required; a missing key in the source
/// document is a configuration error, not a silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardConfig {
    /// Reference maximum used for normalization.
    pub full_set_points: f64,
    /// Points granted once per distinct intent appearing in a dialogue.
    pub intents: HashMap<String, f64>,
    /// Points subtracted per repeated occurrence of an already-credited
    /// intent.
    pub repeat_penalty: f64,
    /// Points subtracted per turn.
    pub cost: f64,
}

impl RewardConfig {
    pub fn from_path(path: &Path) -> Result<Self, EvalError> {
        let content = fs::read_to_string(path).map_err(|e| {
            EvalError::Configuration(format!(
                "cannot read reward configuration {}: {e}",
                path.display()
            ))
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, EvalError> {
        serde_json::from_str(content)
            .map_err(|e| EvalError::Configuration(format!("invalid reward configuration: {e}")))
    }
}

/// Score breakdown for one dialogue.
#[derive(Debug, Clone, Serialize)]
pub struct DialogueReward {
    /// Final clamped score.
    pub reward: f64,
    /// `reward` scaled by `full_set_points`.
    pub normalized: f64,
    /// Points from distinct credited intents.
    pub intent_points: f64,
    /// Total penalty for repeated credited intents.
    pub repeat_penalties: f64,
    /// Total cost of the dialogue's turns.
    pub turn_costs: f64,
}

/// Rewards for a whole batch, one entry per dialogue in input order.
#[derive(Debug, Clone, Serialize)]
pub struct RewardReport {
    pub dialogues: Vec<DialogueReward>,
    pub avg_reward: f64,
}
