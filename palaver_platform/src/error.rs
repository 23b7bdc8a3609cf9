use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("session already registered: {0}")]
    DuplicateSession(String),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error(transparent)]
    Dialogue(#[from] palaver_conversation::Error),
}
