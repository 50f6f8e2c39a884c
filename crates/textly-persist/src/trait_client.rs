use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::hierarchy::ParentLookup;
use crate::models::{
    Conversation, ConversationFilter, ConversationMessage, ConversationUpdate, Document,
    DocumentUpdate, MessageFilter,
};

/// Record store for conversations and their turns
///
/// Implementations provide database-specific CRUD operations. They enforce
/// no business rules; the ledger owns those.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()>;

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>>;

    /// Matching conversations, newest `created` first
    async fn list_conversations(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>>;

    /// Returns false when no conversation has this id
    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<bool>;

    async fn insert_message(&self, message: ConversationMessage) -> Result<()>;

    async fn get_message(&self, id: &str) -> Result<Option<ConversationMessage>>;

    /// Matching messages, ascending by `created`
    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<ConversationMessage>>;

    /// Deactivate active messages at (inclusive) or after the cutoff in a single update
    ///
    /// Returns how many messages were deactivated.
    async fn deactivate_messages_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> Result<u64>;

    /// Newest `created` among all messages of the conversation, active or not
    async fn latest_message_created(&self, conversation_id: &str) -> Result<Option<DateTime<Utc>>>;
}

/// Record store for the document tree
#[async_trait]
pub trait DocumentStore: ParentLookup + Send + Sync {
    async fn insert_document(&self, document: Document) -> Result<()>;

    async fn get_document(&self, id: &str) -> Result<Option<Document>>;

    /// Returns false when no document has this id
    async fn update_document(&self, id: &str, update: DocumentUpdate) -> Result<bool>;
}
