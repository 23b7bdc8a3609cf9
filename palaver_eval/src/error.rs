use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to load dialogue log {path}: {detail}")]
    DialogueLogLoad { path: String, detail: String },

    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("satisfaction classifier error: {0}")]
    Classifier(#[source] anyhow::Error),
}
