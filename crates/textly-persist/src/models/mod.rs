mod conversation;
mod message;
mod document;

// Export database-agnostic models
pub use conversation::{
    Conversation, ConversationFilter, ConversationKind, ConversationTotals, ConversationUpdate,
};
pub use message::{ConversationMessage, MessageFilter, NewTurn};
pub use document::{Document, DocumentUpdate};

use chrono::{DateTime, SubsecRound, Utc};

/// Current time at the store's precision (milliseconds)
///
/// Stored timestamps, ordering and edit cutoffs all share this domain so a
/// value read back from the store compares equal to the one written.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
