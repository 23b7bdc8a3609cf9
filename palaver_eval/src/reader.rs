//! Reading archived dialogue logs.

use std::fs;
use std::path::Path;

use palaver_core::Speaker;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::EvalError;

/// One archived utterance: who spoke, what was said, and the understanding
/// results that were attached at the time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UtteranceRecord {
    pub participant: Speaker,
    pub utterance: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_values: Option<Vec<(String, String)>>,
}

/// One finished conversation. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueRecord {
    pub conversation: Vec<UtteranceRecord>,
}

impl DialogueRecord {
    /// Number of turns, where a turn is one user utterance paired with the
    /// agent reply that follows it, or a lone unmatched utterance.
    #[must_use]
    pub fn turns(&self) -> usize {
        let mut turns = 0;
        let mut i = 0;
        while i < self.conversation.len() {
            if self.conversation[i].participant == Speaker::User
                && self
                    .conversation
                    .get(i + 1)
                    .is_some_and(|next| next.participant == Speaker::Agent)
            {
                i += 2;
            } else {
                i += 1;
            }
            turns += 1;
        }
        turns
    }
}

/// Load a batch of dialogues from a JSON log file.
///
/// A missing file or malformed content is a load error; nothing downstream
/// ever sees a partial batch.
pub fn load_dialogues(path: &Path) -> Result<Vec<DialogueRecord>, EvalError> {
    let content = fs::read_to_string(path).map_err(|e| EvalError::DialogueLogLoad {
        path: path.display().to_string(),
        detail: e.to_string(),
    })?;

    let dialogues: Vec<DialogueRecord> =
        serde_json::from_str(&content).map_err(|e| EvalError::DialogueLogLoad {
            path: path.display().to_string(),
            detail: e.to_string(),
        })?;

    info!(
        "loaded {} dialogues from {}",
        dialogues.len(),
        path.display()
    );
    Ok(dialogues)
}
