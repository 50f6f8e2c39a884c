use textly_persist::{CycleKind, PersistError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("{0}")]
    NotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Circular reference detected: {0}")]
    CircularReference(CycleKind),

    #[error("Upstream stream error: {0}")]
    UpstreamStream(String),

    #[error("Persistence error: {0}")]
    Persistence(#[source] PersistError),
}

impl From<PersistError> for ChatError {
    fn from(err: PersistError) -> Self {
        match err {
            PersistError::ConversationNotFound(_)
            | PersistError::MessageNotFound(_)
            | PersistError::DocumentNotFound(_) => Self::NotFound(err.to_string()),
            PersistError::Forbidden(what) => Self::Forbidden(what),
            PersistError::InvalidInput(reason) => Self::BadRequest(reason),
            PersistError::CircularReference(kind) => Self::CircularReference(kind),
            other => Self::Persistence(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChatError>;
