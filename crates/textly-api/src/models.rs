//! Response bodies. Counters are plain integers, cost a decimal number and
//! timestamps RFC 3339.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use textly_chat::ConversationView;
use textly_persist::{Conversation, ConversationMessage, Document};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelCapabilities {
    pub reasoning: bool,
    pub internet: bool,
    pub standard: bool,
}

/// One entry of the model picker
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub capabilities: ModelCapabilities,
    pub provider: String,
    #[serde(default)]
    pub default: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ModelsResponse {
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub user_message: String,
    pub response_message: String,
    pub thinking_content: String,
    pub model: String,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cost: f64,
    pub active: bool,
    pub created: DateTime<Utc>,
}

impl From<ConversationMessage> for MessageResponse {
    fn from(message: ConversationMessage) -> Self {
        Self {
            id: message.id,
            conversation_id: message.conversation_id,
            user_message: message.user_message,
            response_message: message.response_message,
            thinking_content: message.thinking_content,
            model: message.model,
            input_tokens: message.usage.input_tokens,
            output_tokens: message.usage.output_tokens,
            reasoning_tokens: message.usage.reasoning_tokens,
            cost: message.usage.cost.as_f64(),
            active: message.active,
            created: message.created,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub total_requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cost: f64,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<MessageResponse>>,
}

impl ConversationResponse {
    pub fn new(conversation: Conversation, messages: Option<Vec<ConversationMessage>>) -> Self {
        let totals = conversation.totals;
        Self {
            id: conversation.id,
            user_id: conversation.user_id,
            title: conversation.title,
            kind: conversation.kind.to_string(),
            total_requests: totals.total_requests,
            input_tokens: totals.input_tokens,
            output_tokens: totals.output_tokens,
            reasoning_tokens: totals.reasoning_tokens,
            cost: totals.cost.as_f64(),
            active: conversation.active,
            created: conversation.created,
            updated: conversation.updated,
            messages: messages.map(|m| m.into_iter().map(MessageResponse::from).collect()),
        }
    }

    pub fn with_messages(view: ConversationView) -> Self {
        Self::new(view.conversation, Some(view.messages))
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DocumentResponse {
    pub id: String,
    pub name: String,
    pub parent: Option<String>,
    pub is_folder: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl From<Document> for DocumentResponse {
    fn from(document: Document) -> Self {
        Self {
            id: document.id,
            name: document.name,
            parent: document.parent,
            is_folder: document.is_folder,
            created: document.created,
            updated: document.updated,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuggestionResponse {
    pub suggestion: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}
