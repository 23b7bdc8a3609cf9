//! Per-session dialogue state and its tracker.
//!
//! The tracker is a pure in-memory accumulator: one `update` per utterance,
//! no I/O, no locking. Serialization of concurrent updates for a session is
//! the caller's responsibility (the connector processes one inbound event at
//! a time).

use std::collections::HashMap;

use tracing::debug;

use crate::{Annotation, Intent, Speaker, TaggedUtterance};

/// The accumulated state of one conversation.
#[derive(Debug, Clone, Default)]
pub struct DialogueState {
    /// Every utterance of the session, in arrival order. Append-only.
    pub history: Vec<TaggedUtterance>,
    /// Intent of the most recent user utterance, overwritten on every user
    /// turn — including to `None` when the utterance carries no intent.
    pub last_user_intent: Option<Intent>,
    /// Annotations collected per slot over the whole session. Entries
    /// accumulate; nothing is overwritten or deduplicated.
    pub slots: HashMap<String, Vec<Annotation>>,
    /// Number of user utterances processed so far.
    pub turn_count: usize,
}

/// Tracks the state of a single dialogue.
#[derive(Debug, Default)]
pub struct DialogueStateTracker {
    state: DialogueState,
}

impl DialogueStateTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state of the dialogue.
    #[must_use]
    pub const fn state(&self) -> &DialogueState {
        &self.state
    }

    /// Consume the tracker, yielding the final state.
    #[must_use]
    pub fn into_state(self) -> DialogueState {
        self.state
    }

    /// Fold one utterance into the state.
    ///
    /// Agent utterances only extend the history; user utterances additionally
    /// overwrite the last intent, extend the slot annotations and advance the
    /// turn count.
    pub fn update(&mut self, utterance: TaggedUtterance) {
        if utterance.speaker != Speaker::User {
            self.state.history.push(utterance);
            return;
        }

        self.state.last_user_intent = utterance.utterance.intent.clone();

        for annotation in &utterance.utterance.annotations {
            self.state
                .slots
                .entry(annotation.slot.clone())
                .or_default()
                .push(annotation.clone());
        }

        self.state.turn_count += 1;
        self.state.history.push(utterance);
        debug!(
            "dialogue state advanced to turn {}, {} utterances in history",
            self.state.turn_count,
            self.state.history.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Utterance;

    fn greeting() -> TaggedUtterance {
        Utterance::text("Hello")
            .with_intent(Intent::new("greeting"))
            .with_annotations(vec![Annotation::new("name", Some("John".to_string()))])
            .tagged(Speaker::User)
    }

    #[test]
    fn test_initial_state() {
        let tracker = DialogueStateTracker::new();
        let state = tracker.state();

        assert!(state.history.is_empty());
        assert!(state.last_user_intent.is_none());
        assert!(state.slots.is_empty());
        assert_eq!(state.turn_count, 0);
    }

    #[test]
    fn test_user_utterance_updates_everything() {
        let mut tracker = DialogueStateTracker::new();
        tracker.update(greeting());

        let state = tracker.state();
        assert_eq!(state.history.len(), 1);
        assert_eq!(state.last_user_intent, Some(Intent::new("greeting")));
        assert_eq!(
            state.slots.get("name"),
            Some(&vec![Annotation::new("name", Some("John".to_string()))])
        );
        assert_eq!(state.turn_count, 1);
    }

    #[test]
    fn test_agent_utterance_only_extends_history() {
        let mut tracker = DialogueStateTracker::new();
        tracker.update(greeting());

        let reply = Utterance::text("Hi, how can I assist you?")
            .with_intent(Intent::new("offer_help"))
            .tagged(Speaker::Agent);
        tracker.update(reply.clone());

        let state = tracker.state();
        assert_eq!(state.history.len(), 2);
        assert_eq!(state.history[1], reply);
        assert_eq!(state.last_user_intent, Some(Intent::new("greeting")));
        assert_eq!(state.turn_count, 1);
    }

    #[test]
    fn test_turn_count_matches_user_updates() {
        let mut tracker = DialogueStateTracker::new();

        for i in 0..10 {
            let speaker = if i % 3 == 0 {
                Speaker::User
            } else {
                Speaker::Agent
            };
            tracker.update(Utterance::text(format!("utterance {i}")).tagged(speaker));
        }

        let state = tracker.state();
        assert_eq!(state.history.len(), 10);
        let user_entries = state
            .history
            .iter()
            .filter(|u| u.speaker == Speaker::User)
            .count();
        assert_eq!(state.turn_count, user_entries);
    }

    #[test]
    fn test_intent_overwritten_even_when_absent() {
        let mut tracker = DialogueStateTracker::new();
        tracker.update(greeting());
        assert_eq!(
            tracker.state().last_user_intent,
            Some(Intent::new("greeting"))
        );

        tracker.update(Utterance::text("hmm").tagged(Speaker::User));
        assert!(tracker.state().last_user_intent.is_none());
        assert_eq!(tracker.state().turn_count, 2);
    }

    #[test]
    fn test_slots_accumulate_without_loss() {
        let mut tracker = DialogueStateTracker::new();

        for value in ["action", "fantasy", "action"] {
            tracker.update(
                Utterance::text(format!("I like {value} movies"))
                    .with_intent(Intent::new("DISCLOSE"))
                    .with_annotations(vec![Annotation::new("GENRE", Some(value.to_string()))])
                    .tagged(Speaker::User),
            );
        }

        let state = tracker.state();
        let genres = state.slots.get("GENRE").map(Vec::as_slice).unwrap_or(&[]);
        assert_eq!(genres.len(), 3);
        assert_eq!(genres[0].value.as_deref(), Some("action"));
        assert_eq!(genres[2].value.as_deref(), Some("action"));
    }

    #[test]
    fn test_history_keeps_arrival_order() {
        let mut tracker = DialogueStateTracker::new();

        for i in 0..5 {
            tracker.update(Utterance::text(format!("message {i}")).tagged(Speaker::User));
        }

        let texts: Vec<&str> = tracker
            .state()
            .history
            .iter()
            .map(|u| u.utterance.text.as_str())
            .collect();
        assert_eq!(
            texts,
            ["message 0", "message 1", "message 2", "message 3", "message 4"]
        );
    }
}
