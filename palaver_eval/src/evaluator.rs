//! Metric computation over a batch of finished dialogues.

use std::collections::HashMap;
use std::fmt::Write as _;

use once_cell::sync::OnceCell;
use rayon::prelude::*;
use tracing::info;

use crate::reader::DialogueRecord;
use crate::reward::{DialogueReward, RewardConfig, RewardReport};
use crate::satisfaction::SatisfactionClassifier;
use crate::EvalError;

/// Scores a fixed batch of dialogue records.
///
/// The batch is immutable for the evaluator's lifetime, so metrics are pure
/// functions of it: per-record work fans out over the rayon pool and the
/// averaged turn statistic is computed once and cached.
pub struct Evaluator {
    dialogues: Vec<DialogueRecord>,
    reward_config: RewardConfig,
    avg_turns: OnceCell<f64>,
}

impl Evaluator {
    #[must_use]
    pub fn new(dialogues: Vec<DialogueRecord>, reward_config: RewardConfig) -> Self {
        info!("evaluator over {} dialogues", dialogues.len());
        Self {
            dialogues,
            reward_config,
            avg_turns: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn dialogues(&self) -> &[DialogueRecord] {
        &self.dialogues
    }

    /// Average number of turns per dialogue.
    ///
    /// Computed once; repeated calls return the identical cached value.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn avg_turns(&self) -> f64 {
        *self.avg_turns.get_or_init(|| {
            if self.dialogues.is_empty() {
                return 0.0;
            }
            let total: usize = self.dialogues.iter().map(DialogueRecord::turns).sum();
            total as f64 / self.dialogues.len() as f64
        })
    }

    /// Utterance counts per participant plus their cross ratios.
    ///
    /// The returned map contains `"USER"`, `"AGENT"`, `"USER/AGENT"` and
    /// `"AGENT/USER"`; a ratio is 0 when its denominator is 0.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn user_act_ratio(&self) -> HashMap<String, f64> {
        let mut counts: HashMap<String, f64> = HashMap::new();

        for dialogue in &self.dialogues {
            for utterance in &dialogue.conversation {
                *counts.entry(utterance.participant.to_string()).or_default() += 1.0;
            }
        }

        let user = counts.get("USER").copied().unwrap_or_default();
        let agent = counts.get("AGENT").copied().unwrap_or_default();
        counts.entry("USER".to_string()).or_insert(0.0);
        counts.entry("AGENT".to_string()).or_insert(0.0);
        counts.insert("USER/AGENT".to_string(), ratio(user, agent));
        counts.insert("AGENT/USER".to_string(), ratio(agent, user));
        counts
    }

    /// Score every dialogue against the reward configuration.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reward(&self) -> RewardReport {
        let dialogues: Vec<DialogueReward> = self
            .dialogues
            .par_iter()
            .map(|dialogue| self.dialogue_reward(dialogue))
            .collect();

        let avg_reward = if dialogues.is_empty() {
            0.0
        } else {
            dialogues.iter().map(|d| d.reward).sum::<f64>() / dialogues.len() as f64
        };

        RewardReport {
            dialogues,
            avg_reward,
        }
    }

    /// Score every dialogue with the supplied classifier, in input order.
    ///
    /// One failing classification aborts the whole batch.
    pub fn satisfaction(
        &self,
        classifier: &dyn SatisfactionClassifier,
    ) -> Result<Vec<i32>, EvalError> {
        self.dialogues
            .par_iter()
            .map(|dialogue| {
                classifier
                    .classify(&Self::features(dialogue))
                    .map_err(EvalError::Classifier)
            })
            .collect()
    }

    /// Intent coverage minus repetition and length penalties, clamped at 0.
    #[allow(clippy::cast_precision_loss)]
    fn dialogue_reward(&self, dialogue: &DialogueRecord) -> DialogueReward {
        let mut occurrences: HashMap<&str, usize> = HashMap::new();
        for utterance in &dialogue.conversation {
            if let Some(intent) = utterance.intent.as_deref() {
                if self.reward_config.intents.contains_key(intent) {
                    *occurrences.entry(intent).or_default() += 1;
                }
            }
        }

        let intent_points: f64 = occurrences
            .keys()
            .filter_map(|intent| self.reward_config.intents.get(*intent))
            .sum();
        let repeats: usize = occurrences.values().map(|&n| n.saturating_sub(1)).sum();
        let repeat_penalties = self.reward_config.repeat_penalty * repeats as f64;
        let turn_costs = self.reward_config.cost * dialogue.turns() as f64;

        let reward = (intent_points - repeat_penalties - turn_costs).max(0.0);
        let normalized = if self.reward_config.full_set_points > 0.0 {
            reward / self.reward_config.full_set_points
        } else {
            0.0
        };

        DialogueReward {
            reward,
            normalized,
            intent_points,
            repeat_penalties,
            turn_costs,
        }
    }

    /// Render a dialogue into the line-per-utterance feature text handed to
    /// the satisfaction classifier.
    fn features(dialogue: &DialogueRecord) -> String {
        let mut text = String::new();
        for utterance in &dialogue.conversation {
            let _ = writeln!(text, "{}: {}", utterance.participant, utterance.utterance);
        }
        text
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::UtteranceRecord;
    use palaver_core::Speaker;

    fn utterance(participant: Speaker, intent: Option<&str>) -> UtteranceRecord {
        UtteranceRecord {
            participant,
            utterance: "...".to_string(),
            intent: intent.map(str::to_string),
            slot_values: None,
        }
    }

    fn config() -> RewardConfig {
        RewardConfig {
            full_set_points: 20.0,
            intents: HashMap::from([("DISCLOSE".to_string(), 4.0), ("INQUIRE".to_string(), 4.0)]),
            repeat_penalty: 1.0,
            cost: 1.0,
        }
    }

    fn exchange(user_intents: &[Option<&str>]) -> DialogueRecord {
        let mut conversation = Vec::new();
        for intent in user_intents {
            conversation.push(utterance(Speaker::User, *intent));
            conversation.push(utterance(Speaker::Agent, None));
        }
        DialogueRecord { conversation }
    }

    #[test]
    fn test_avg_turns_is_memoized_and_stable() {
        let dialogues = vec![
            exchange(&[Some("DISCLOSE"); 12]),
            exchange(&[Some("INQUIRE"); 20]),
        ];
        let evaluator = Evaluator::new(dialogues, config());

        let first = evaluator.avg_turns();
        let second = evaluator.avg_turns();
        assert!((first - 16.0).abs() < f64::EPSILON);
        assert!((first - second).abs() < f64::EPSILON);
    }

    #[test]
    fn test_avg_turns_empty_batch_is_zero() {
        let evaluator = Evaluator::new(Vec::new(), config());
        assert!(evaluator.avg_turns().abs() < f64::EPSILON);
    }

    #[test]
    fn test_user_act_ratio_counts_and_ratios() {
        let mut dialogue = exchange(&[Some("DISCLOSE"), None]);
        // One extra user utterance without an agent reply.
        dialogue.conversation.push(utterance(Speaker::User, None));
        let evaluator = Evaluator::new(vec![dialogue], config());

        let stats = evaluator.user_act_ratio();
        assert!((stats["USER"] - 3.0).abs() < f64::EPSILON);
        assert!((stats["AGENT"] - 2.0).abs() < f64::EPSILON);
        assert!((stats["USER/AGENT"] - 1.5).abs() < f64::EPSILON);
        assert!((stats["AGENT/USER"] - 2.0 / 3.0).abs() < f64::EPSILON);

        let total = stats["USER"] + stats["AGENT"];
        assert!((total - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_user_act_ratio_zero_denominator_is_zero() {
        let dialogue = DialogueRecord {
            conversation: vec![utterance(Speaker::User, None)],
        };
        let evaluator = Evaluator::new(vec![dialogue], config());

        let stats = evaluator.user_act_ratio();
        assert!(stats["AGENT"].abs() < f64::EPSILON);
        assert!(stats["USER/AGENT"].abs() < f64::EPSILON);
        assert!(stats["AGENT/USER"].abs() < f64::EPSILON);
    }

    #[test]
    fn test_reward_credits_each_intent_once_and_penalizes_repeats() {
        // 4 turns; DISCLOSE twice (one repeat), INQUIRE once.
        let dialogue = exchange(&[
            Some("DISCLOSE"),
            Some("DISCLOSE"),
            Some("INQUIRE"),
            None,
        ]);
        let evaluator = Evaluator::new(vec![dialogue], config());

        let report = evaluator.reward();
        assert_eq!(report.dialogues.len(), 1);

        let entry = &report.dialogues[0];
        assert!((entry.intent_points - 8.0).abs() < f64::EPSILON);
        assert!((entry.repeat_penalties - 1.0).abs() < f64::EPSILON);
        assert!((entry.turn_costs - 4.0).abs() < f64::EPSILON);
        assert!((entry.reward - 3.0).abs() < f64::EPSILON);
        assert!((entry.normalized - 0.15).abs() < f64::EPSILON);
        assert!((report.avg_reward - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reward_never_negative() {
        // Long dialogue with no credited intents: pure cost, clamped to 0.
        let dialogue = exchange(&[None; 30]);
        let evaluator = Evaluator::new(vec![dialogue], config());

        let report = evaluator.reward();
        assert!(report.dialogues.iter().all(|d| d.reward >= 0.0));
        assert!(report.dialogues[0].reward.abs() < f64::EPSILON);
    }

    struct FixedClassifier(i32);

    impl SatisfactionClassifier for FixedClassifier {
        fn classify(&self, _conversation: &str) -> anyhow::Result<i32> {
            Ok(self.0)
        }
    }

    struct FailingClassifier;

    impl SatisfactionClassifier for FailingClassifier {
        fn classify(&self, _conversation: &str) -> anyhow::Result<i32> {
            anyhow::bail!("model unavailable")
        }
    }

    #[test]
    fn test_satisfaction_collects_in_order() {
        let dialogues = vec![exchange(&[Some("DISCLOSE")]), exchange(&[None, None])];
        let evaluator = Evaluator::new(dialogues, config());

        let scores = evaluator.satisfaction(&FixedClassifier(4));
        let Ok(scores) = scores else {
            panic!("expected satisfaction scores");
        };
        assert_eq!(scores, vec![4, 4]);
        assert!(scores.iter().all(|s| (1..=5).contains(s)));
    }

    #[test]
    fn test_satisfaction_failure_aborts_batch() {
        let evaluator = Evaluator::new(vec![exchange(&[None])], config());
        let outcome = evaluator.satisfaction(&FailingClassifier);
        assert!(matches!(outcome, Err(EvalError::Classifier(_))));
    }

    #[test]
    fn test_features_render_one_line_per_utterance() {
        let dialogue = exchange(&[Some("DISCLOSE")]);
        let features = Evaluator::features(&dialogue);
        assert_eq!(features.lines().count(), 2);
        assert!(features.starts_with("USER: "));
    }
}
