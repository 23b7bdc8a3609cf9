//! Seam to the pluggable satisfaction model.

/// Scores a rendered conversation on a 1–5 scale.
///
/// The implementation is opaque to the evaluator: it receives the feature
/// text built from a dialogue and must return an integer in `[1, 5]`. The
/// evaluator neither validates nor clamps the output; it only surfaces
/// failures.
pub trait SatisfactionClassifier: Send + Sync {
    fn classify(&self, conversation: &str) -> anyhow::Result<i32>;
}
