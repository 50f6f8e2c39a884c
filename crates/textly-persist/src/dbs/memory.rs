use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::hierarchy::ParentLookup;
use crate::models::{
    Conversation, ConversationFilter, ConversationMessage, ConversationUpdate, Document,
    DocumentUpdate, MessageFilter,
};
use crate::trait_client::{ConversationStore, DocumentStore};

/// In-process store backed by hash maps
///
/// Used for development runs and tests. Each operation takes the relevant
/// lock once, so every method is atomic on its own.
#[derive(Default)]
pub struct MemoryStore {
    conversations: RwLock<HashMap<String, Conversation>>,
    messages: RwLock<HashMap<String, ConversationMessage>>,
    documents: RwLock<HashMap<String, Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for MemoryStore {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()> {
        let mut conversations = self.conversations.write().await;
        if conversations.contains_key(&conversation.id) {
            return Err(PersistError::Database(format!(
                "duplicate conversation id {}",
                conversation.id
            )));
        }
        conversations.insert(conversation.id.clone(), conversation);
        Ok(())
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.read().await.get(id).cloned())
    }

    async fn list_conversations(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>> {
        let mut found: Vec<Conversation> = self
            .conversations
            .read()
            .await
            .values()
            .filter(|c| filter.matches(c))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(found)
    }

    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<bool> {
        match self.conversations.write().await.get_mut(id) {
            Some(conversation) => {
                update.apply(conversation);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_message(&self, message: ConversationMessage) -> Result<()> {
        let mut messages = self.messages.write().await;
        if messages.contains_key(&message.id) {
            return Err(PersistError::Database(format!("duplicate message id {}", message.id)));
        }
        messages.insert(message.id.clone(), message);
        Ok(())
    }

    async fn get_message(&self, id: &str) -> Result<Option<ConversationMessage>> {
        Ok(self.messages.read().await.get(id).cloned())
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<ConversationMessage>> {
        let mut found: Vec<ConversationMessage> = self
            .messages
            .read()
            .await
            .values()
            .filter(|m| filter.matches(m))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn deactivate_messages_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> Result<u64> {
        let mut messages = self.messages.write().await;
        let mut count = 0;
        for message in messages.values_mut() {
            let at_or_after = if inclusive {
                message.created >= cutoff
            } else {
                message.created > cutoff
            };
            if message.conversation_id == conversation_id && message.active && at_or_after {
                message.active = false;
                count += 1;
            }
        }
        Ok(count)
    }

    async fn latest_message_created(&self, conversation_id: &str) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .messages
            .read()
            .await
            .values()
            .filter(|m| m.conversation_id == conversation_id)
            .map(|m| m.created)
            .max())
    }
}

#[async_trait]
impl ParentLookup for MemoryStore {
    async fn parent_of(&self, id: &str) -> Result<Option<String>> {
        self.documents
            .read()
            .await
            .get(id)
            .map(|d| d.parent.clone())
            .ok_or_else(|| PersistError::DocumentNotFound(id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_document(&self, document: Document) -> Result<()> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&document.id) {
            return Err(PersistError::Database(format!("duplicate document id {}", document.id)));
        }
        documents.insert(document.id.clone(), document);
        Ok(())
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.read().await.get(id).cloned())
    }

    async fn update_document(&self, id: &str, update: DocumentUpdate) -> Result<bool> {
        match self.documents.write().await.get_mut(id) {
            Some(document) => {
                update.apply(document);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
