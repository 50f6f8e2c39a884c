use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use textly_llm::TokenUsage;

use crate::error::{PersistError, Result};
use crate::models::{
    now_millis, Conversation, ConversationFilter, ConversationKind, ConversationMessage,
    ConversationTotals, ConversationUpdate, MessageFilter, NewTurn,
};
use crate::trait_client::ConversationStore;

/// Owns conversation and turn records
///
/// Ownership-agnostic: callers check `Conversation::is_owned_by` themselves.
/// `accumulate_totals` is a read-modify-write; callers that may commit two
/// turns to the same conversation at once must serialize per conversation id.
#[derive(Clone)]
pub struct ConversationLedger {
    store: Arc<dyn ConversationStore>,
}

impl ConversationLedger {
    pub fn new(store: Arc<dyn ConversationStore>) -> Self {
        Self { store }
    }

    pub async fn create_conversation(
        &self,
        user_id: &str,
        title: &str,
        kind: ConversationKind,
    ) -> Result<Conversation> {
        let conversation = Conversation::new(user_id, title, kind);
        self.store.insert_conversation(conversation.clone()).await?;

        tracing::debug!(conversation_id = %conversation.id, kind = %kind, "Conversation created");
        Ok(conversation)
    }

    pub async fn get_conversation(&self, id: &str) -> Result<Conversation> {
        self.store
            .get_conversation(id)
            .await?
            .ok_or_else(|| PersistError::ConversationNotFound(id.to_string()))
    }

    /// Active conversations of a user, newest first
    pub async fn list_active_conversations(
        &self,
        user_id: &str,
        kind: Option<ConversationKind>,
    ) -> Result<Vec<Conversation>> {
        let filter = ConversationFilter::active_for(user_id).kind(kind);
        self.store.list_conversations(&filter).await
    }

    pub async fn get_message(&self, id: &str) -> Result<ConversationMessage> {
        self.store
            .get_message(id)
            .await?
            .ok_or_else(|| PersistError::MessageNotFound(id.to_string()))
    }

    /// The current timeline: active turns, oldest first
    pub async fn get_active_turns_ordered(&self, conversation_id: &str) -> Result<Vec<ConversationMessage>> {
        self.store
            .list_messages(&MessageFilter::active_in(conversation_id))
            .await
    }

    /// Insert a committed turn as active
    ///
    /// `created` is the commit time, bumped past the newest existing message
    /// of the conversation so timestamps form a strict order even when two
    /// turns land within the same millisecond.
    pub async fn append_turn(&self, turn: NewTurn) -> Result<ConversationMessage> {
        let created = self.next_turn_timestamp(&turn.conversation_id).await?;
        let message = turn.into_message(created);
        self.store.insert_message(message.clone()).await?;

        tracing::debug!(
            conversation_id = %message.conversation_id,
            message_id = %message.id,
            "Turn appended"
        );
        Ok(message)
    }

    async fn next_turn_timestamp(&self, conversation_id: &str) -> Result<DateTime<Utc>> {
        let now = now_millis();
        match self.store.latest_message_created(conversation_id).await? {
            Some(latest) if latest >= now => Ok(latest + Duration::milliseconds(1)),
            _ => Ok(now),
        }
    }

    /// Deactivate active turns created at or after the cutoff when `inclusive`,
    /// strictly after it otherwise
    pub async fn invalidate_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> Result<u64> {
        let count = self
            .store
            .deactivate_messages_from(conversation_id, cutoff, inclusive)
            .await?;

        tracing::info!(conversation_id, count, %cutoff, "Turns invalidated");
        Ok(count)
    }

    /// Add one request's usage to the running totals and return the new totals
    pub async fn accumulate_totals(
        &self,
        conversation_id: &str,
        delta: &TokenUsage,
    ) -> Result<ConversationTotals> {
        let conversation = self.get_conversation(conversation_id).await?;
        let totals = conversation.totals.add_request(delta);

        let update = ConversationUpdate {
            totals: Some(totals),
            updated: Some(now_millis()),
            ..Default::default()
        };
        if !self.store.update_conversation(conversation_id, update).await? {
            return Err(PersistError::ConversationNotFound(conversation_id.to_string()));
        }

        tracing::debug!(
            conversation_id,
            total_requests = totals.total_requests,
            cost = %totals.cost,
            "Conversation totals updated"
        );
        Ok(totals)
    }

    /// Soft delete; the conversation's turns are left as they are
    pub async fn deactivate(&self, conversation_id: &str) -> Result<()> {
        let update = ConversationUpdate {
            active: Some(false),
            updated: Some(now_millis()),
            ..Default::default()
        };
        if !self.store.update_conversation(conversation_id, update).await? {
            return Err(PersistError::ConversationNotFound(conversation_id.to_string()));
        }
        Ok(())
    }
}
