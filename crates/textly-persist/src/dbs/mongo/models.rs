use bson::DateTime as BsonDateTime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textly_llm::{Cost, TokenUsage};

use crate::models::{
    Conversation, ConversationKind, ConversationMessage, ConversationTotals, Document,
};

pub(crate) fn to_bson_time(time: DateTime<Utc>) -> BsonDateTime {
    BsonDateTime::from_millis(time.timestamp_millis())
}

pub(crate) fn from_bson_time(time: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(time.timestamp_millis()).unwrap_or_default()
}

/// Stored conversation; token counters as i64, cost in micro-units
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConversation {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: ConversationKind,
    pub total_requests: i64,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub reasoning_tokens: i64,
    pub cost_micros: i64,
    pub active: bool,
    pub created: BsonDateTime,
    pub updated: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub conversation_id: String,
    pub user_message: String,
    pub response_message: String,
    #[serde(default)]
    pub thinking_content: String,
    pub model: String,
    pub input_tokens: i64,
    pub output_tokens: i64,
    pub reasoning_tokens: i64,
    pub cost_micros: i64,
    pub active: bool,
    pub created: BsonDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoDocument {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    pub is_folder: bool,
    pub created: BsonDateTime,
    pub updated: BsonDateTime,
}

impl From<Conversation> for MongoConversation {
    fn from(c: Conversation) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            title: c.title,
            kind: c.kind,
            total_requests: c.totals.total_requests as i64,
            input_tokens: c.totals.input_tokens as i64,
            output_tokens: c.totals.output_tokens as i64,
            reasoning_tokens: c.totals.reasoning_tokens as i64,
            cost_micros: c.totals.cost.micros(),
            active: c.active,
            created: to_bson_time(c.created),
            updated: to_bson_time(c.updated),
        }
    }
}

impl From<MongoConversation> for Conversation {
    fn from(c: MongoConversation) -> Self {
        Self {
            id: c.id,
            user_id: c.user_id,
            title: c.title,
            kind: c.kind,
            totals: ConversationTotals {
                total_requests: c.total_requests.max(0) as u64,
                input_tokens: c.input_tokens.max(0) as u64,
                output_tokens: c.output_tokens.max(0) as u64,
                reasoning_tokens: c.reasoning_tokens.max(0) as u64,
                cost: Cost::from_micros(c.cost_micros),
            },
            active: c.active,
            created: from_bson_time(c.created),
            updated: from_bson_time(c.updated),
        }
    }
}

impl From<ConversationMessage> for MongoMessage {
    fn from(m: ConversationMessage) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            conversation_id: m.conversation_id,
            user_message: m.user_message,
            response_message: m.response_message,
            thinking_content: m.thinking_content,
            model: m.model,
            input_tokens: m.usage.input_tokens as i64,
            output_tokens: m.usage.output_tokens as i64,
            reasoning_tokens: m.usage.reasoning_tokens as i64,
            cost_micros: m.usage.cost.micros(),
            active: m.active,
            created: to_bson_time(m.created),
        }
    }
}

impl From<MongoMessage> for ConversationMessage {
    fn from(m: MongoMessage) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            conversation_id: m.conversation_id,
            user_message: m.user_message,
            response_message: m.response_message,
            thinking_content: m.thinking_content,
            model: m.model,
            usage: TokenUsage {
                input_tokens: m.input_tokens.max(0) as u64,
                output_tokens: m.output_tokens.max(0) as u64,
                reasoning_tokens: m.reasoning_tokens.max(0) as u64,
                cost: Cost::from_micros(m.cost_micros),
            },
            active: m.active,
            created: from_bson_time(m.created),
        }
    }
}

impl From<Document> for MongoDocument {
    fn from(d: Document) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            name: d.name,
            parent: d.parent,
            is_folder: d.is_folder,
            created: to_bson_time(d.created),
            updated: to_bson_time(d.updated),
        }
    }
}

impl From<MongoDocument> for Document {
    fn from(d: MongoDocument) -> Self {
        Self {
            id: d.id,
            user_id: d.user_id,
            name: d.name,
            parent: d.parent,
            is_folder: d.is_folder,
            created: from_bson_time(d.created),
            updated: from_bson_time(d.updated),
        }
    }
}
