use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::Client;

use crate::dbs::mongo::repositories::{
    MongoConversationRepository, MongoDocumentRepository, MongoMessageRepository,
};
use crate::error::{PersistError, Result};
use crate::hierarchy::ParentLookup;
use crate::models::{
    Conversation, ConversationFilter, ConversationMessage, ConversationUpdate, Document,
    DocumentUpdate, MessageFilter,
};
use crate::trait_client::{ConversationStore, DocumentStore};

/// MongoDB-backed store for conversations, their turns and documents
pub struct MongoStore {
    conversations: MongoConversationRepository,
    messages: MongoMessageRepository,
    documents: MongoDocumentRepository,
}

impl MongoStore {
    /// Connect to MongoDB and create the store
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database, "Connected to MongoDB");

        Ok(Self {
            conversations: MongoConversationRepository::new(&client, database),
            messages: MongoMessageRepository::new(&client, database),
            documents: MongoDocumentRepository::new(&client, database),
        })
    }
}

#[async_trait]
impl ConversationStore for MongoStore {
    async fn insert_conversation(&self, conversation: Conversation) -> Result<()> {
        self.conversations.insert(conversation.into()).await
    }

    async fn get_conversation(&self, id: &str) -> Result<Option<Conversation>> {
        Ok(self.conversations.find(id).await?.map(Into::into))
    }

    async fn list_conversations(&self, filter: &ConversationFilter) -> Result<Vec<Conversation>> {
        let found = self.conversations.list(filter).await?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn update_conversation(&self, id: &str, update: ConversationUpdate) -> Result<bool> {
        self.conversations.update(id, update).await
    }

    async fn insert_message(&self, message: ConversationMessage) -> Result<()> {
        self.messages.insert(message.into()).await
    }

    async fn get_message(&self, id: &str) -> Result<Option<ConversationMessage>> {
        Ok(self.messages.find(id).await?.map(Into::into))
    }

    async fn list_messages(&self, filter: &MessageFilter) -> Result<Vec<ConversationMessage>> {
        let found = self.messages.list(filter).await?;
        Ok(found.into_iter().map(Into::into).collect())
    }

    async fn deactivate_messages_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> Result<u64> {
        self.messages
            .deactivate_from(conversation_id, cutoff, inclusive)
            .await
    }

    async fn latest_message_created(&self, conversation_id: &str) -> Result<Option<DateTime<Utc>>> {
        self.messages.latest_created(conversation_id).await
    }
}

#[async_trait]
impl ParentLookup for MongoStore {
    async fn parent_of(&self, id: &str) -> Result<Option<String>> {
        self.documents
            .find(id)
            .await?
            .map(|d| d.parent)
            .ok_or_else(|| PersistError::DocumentNotFound(id.to_string()))
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_document(&self, document: Document) -> Result<()> {
        self.documents.insert(document.into()).await
    }

    async fn get_document(&self, id: &str) -> Result<Option<Document>> {
        Ok(self.documents.find(id).await?.map(Into::into))
    }

    async fn update_document(&self, id: &str, update: DocumentUpdate) -> Result<bool> {
        self.documents.update(id, update).await
    }
}
