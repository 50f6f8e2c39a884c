//! Client-facing events of a streamed turn and their `text/event-stream` encoding.

use serde_json::json;

/// One event on the live channel of a turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnEvent {
    /// First event of a newly started conversation
    ConversationId(String),
    /// Reasoning phase boundary
    Thinking(bool),
    ThinkingContent(String),
    Content(String),
    /// Id of the committed turn, sent right before `Done`
    MessageId(String),
    /// The turn failed; no `Done` follows
    Error(String),
    Done,
}

impl TurnEvent {
    /// Body of the `data:` line
    ///
    /// Content goes out raw with line breaks escaped; everything else is a
    /// small JSON object, or the `[DONE]` sentinel.
    pub fn to_sse_payload(&self) -> String {
        match self {
            Self::Content(text) => escape_line_breaks(text),
            Self::ConversationId(id) => json!({ "conversation_id": id }).to_string(),
            Self::Thinking(active) => json!({ "thinking": active }).to_string(),
            Self::ThinkingContent(text) => json!({ "thinking_content": text }).to_string(),
            Self::MessageId(id) => json!({ "message_id": id }).to_string(),
            Self::Error(message) => json!({ "error": message }).to_string(),
            Self::Done => "[DONE]".to_string(),
        }
    }

    pub fn to_sse_frame(&self) -> String {
        format!("data: {}\n\n", self.to_sse_payload())
    }

    /// True for the last event a turn can emit
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Error(_))
    }
}

fn escape_line_breaks(text: &str) -> String {
    text.replace('\n', "\\n").replace('\r', "\\r")
}
