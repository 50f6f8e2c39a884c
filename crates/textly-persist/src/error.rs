use std::fmt;
use thiserror::Error;

/// Which rule a rejected parent assignment broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    /// The walk reached the document being modified
    SelfReference,
    /// The walk revisited an ancestor (pre-existing loop in stored data)
    Loop,
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleKind::SelfReference => write!(f, "item cannot reference itself"),
            CycleKind::Loop => write!(f, "loop in parent chain"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Access denied: {0}")]
    Forbidden(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Circular reference detected: {0}")]
    CircularReference(CycleKind),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl PersistError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::ConversationNotFound(_) | Self::MessageNotFound(_) | Self::DocumentNotFound(_)
        )
    }
}

#[cfg(feature = "mongodb")]
impl From<mongodb::error::Error> for PersistError {
    fn from(err: mongodb::error::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(feature = "mongodb")]
impl From<bson::ser::Error> for PersistError {
    fn from(err: bson::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PersistError>;
