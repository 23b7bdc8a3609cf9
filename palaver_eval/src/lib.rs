#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Batch scoring of completed conversations.
//!
//! The evaluator works on archived dialogue logs, never on live sessions:
//! a batch is loaded once, held immutably, and scored. A failed load or a
//! failing classifier aborts the whole computation — averages and ratios
//! over partial batches would be meaningless.

mod error;
mod evaluator;
mod reader;
mod reward;
mod satisfaction;
pub mod templates;

pub use error::EvalError;
pub use evaluator::Evaluator;
pub use reader::{DialogueRecord, UtteranceRecord, load_dialogues};
pub use reward::{DialogueReward, RewardConfig, RewardReport};
pub use satisfaction::SatisfactionClassifier;
