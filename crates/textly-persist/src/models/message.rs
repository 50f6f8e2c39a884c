use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textly_llm::TokenUsage;

/// One committed turn: a user message and the model's answer to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub user_message: String,
    pub response_message: String,
    pub thinking_content: String,
    pub model: String,
    pub usage: TokenUsage,
    /// False once superseded by an edit. Turns are never deleted.
    pub active: bool,
    pub created: DateTime<Utc>,
}

/// Turn contents handed to the ledger; id, timestamp and activity are assigned on append
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewTurn {
    pub user_id: String,
    pub conversation_id: String,
    pub user_message: String,
    pub response_message: String,
    pub thinking_content: String,
    pub model: String,
    pub usage: TokenUsage,
}

impl NewTurn {
    pub fn into_message(self, created: DateTime<Utc>) -> ConversationMessage {
        ConversationMessage {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: self.user_id,
            conversation_id: self.conversation_id,
            user_message: self.user_message,
            response_message: self.response_message,
            thinking_content: self.thinking_content,
            model: self.model,
            usage: self.usage,
            active: true,
            created,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MessageFilter {
    pub conversation_id: String,
    pub active_only: bool,
}

impl MessageFilter {
    pub fn active_in(conversation_id: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            active_only: true,
        }
    }

    pub fn matches(&self, message: &ConversationMessage) -> bool {
        message.conversation_id == self.conversation_id && (!self.active_only || message.active)
    }
}
