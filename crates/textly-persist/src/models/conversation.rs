use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use textly_llm::{Cost, TokenUsage};

/// What produced a conversation: interactive chat or one of the text tools
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Chat,
    Improvement,
    Synonyms,
    Description,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chat => "chat",
            Self::Improvement => "improvement",
            Self::Synonyms => "synonyms",
            Self::Description => "description",
        }
    }
}

impl fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConversationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "chat" => Ok(Self::Chat),
            "improvement" => Ok(Self::Improvement),
            "synonyms" => Ok(Self::Synonyms),
            "description" => Ok(Self::Description),
            other => Err(format!("unknown conversation type: {}", other)),
        }
    }
}

/// Running aggregates over every committed turn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTotals {
    pub total_requests: u64,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub reasoning_tokens: u64,
    pub cost: Cost,
}

impl ConversationTotals {
    /// Totals after one more committed request with the given usage
    pub fn add_request(self, delta: &TokenUsage) -> Self {
        Self {
            total_requests: self.total_requests + 1,
            input_tokens: self.input_tokens + delta.input_tokens,
            output_tokens: self.output_tokens + delta.output_tokens,
            reasoning_tokens: self.reasoning_tokens + delta.reasoning_tokens,
            cost: self.cost + delta.cost,
        }
    }
}

/// Database-agnostic conversation model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub kind: ConversationKind,
    pub totals: ConversationTotals,
    pub active: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Conversation {
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, kind: ConversationKind) -> Self {
        let now = super::now_millis();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            title: title.into(),
            kind,
            totals: ConversationTotals::default(),
            active: true,
            created: now,
            updated: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Typed partial update; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationUpdate {
    pub title: Option<String>,
    pub active: Option<bool>,
    pub totals: Option<ConversationTotals>,
    pub updated: Option<DateTime<Utc>>,
}

impl ConversationUpdate {
    pub fn apply(&self, conversation: &mut Conversation) {
        if let Some(title) = &self.title {
            conversation.title = title.clone();
        }
        if let Some(active) = self.active {
            conversation.active = active;
        }
        if let Some(totals) = self.totals {
            conversation.totals = totals;
        }
        if let Some(updated) = self.updated {
            conversation.updated = updated;
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversationFilter {
    pub user_id: String,
    pub kind: Option<ConversationKind>,
    pub active_only: bool,
}

impl ConversationFilter {
    pub fn active_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            kind: None,
            active_only: true,
        }
    }

    pub fn kind(mut self, kind: Option<ConversationKind>) -> Self {
        self.kind = kind;
        self
    }

    pub fn matches(&self, conversation: &Conversation) -> bool {
        conversation.user_id == self.user_id
            && (!self.active_only || conversation.active)
            && self.kind.map_or(true, |k| conversation.kind == k)
    }
}
