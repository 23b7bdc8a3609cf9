//! Utterance template extraction from annotated logs.
//!
//! A pure, stateless transform used on the generation side: for every user
//! intent, collect the distinct ways users phrased it, with literal slot
//! values replaced by `{SLOT_LABEL}` placeholders.

use std::collections::HashMap;

use palaver_core::Speaker;
use tracing::debug;

use crate::reader::DialogueRecord;

/// Replace each literal slot value in the utterance with its placeholder.
///
/// `[["GENRE", "action"], ["GENRE", "fantasy"]]` turns
/// `"I like action or fantasy movies"` into `"I like {GENRE} or {GENRE} movies"`.
#[must_use]
pub fn replace_slot_with_placeholder(utterance: &str, slot_values: &[(String, String)]) -> String {
    let mut template = utterance.to_string();
    for (label, value) in slot_values {
        template = template.replace(value, &format!("{{{label}}}"));
    }
    template
}

/// Extract response templates per user intent.
///
/// Only user utterances carrying an intent label contribute; templates are
/// deduplicated in first-seen order.
#[must_use]
pub fn extract_templates(dialogues: &[DialogueRecord]) -> HashMap<String, Vec<String>> {
    let mut templates: HashMap<String, Vec<String>> = HashMap::new();

    for dialogue in dialogues {
        for utterance in &dialogue.conversation {
            if utterance.participant != Speaker::User {
                continue;
            }
            let Some(intent) = utterance.intent.as_deref() else {
                continue;
            };

            let template = utterance.slot_values.as_ref().map_or_else(
                || utterance.utterance.clone(),
                |slot_values| replace_slot_with_placeholder(&utterance.utterance, slot_values),
            );

            let entry = templates.entry(intent.to_string()).or_default();
            if !entry.contains(&template) {
                entry.push(template);
            }
        }
    }

    debug!("extracted templates for {} intents", templates.len());
    templates
}
