use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

use textly_llm::Message;
use textly_persist::{ConversationKind, ConversationLedger, NewTurn};

use crate::error::{ChatError, Result};
use crate::orchestrator::truncate_with_ellipsis;
use crate::streamer::CompletionStreamer;
use crate::templates;

const ASSIST_TITLE_CHARS: usize = 100;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssistRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssistKind {
    Improvement,
    Synonyms,
    Description,
}

impl AssistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improvement => "improvement",
            Self::Synonyms => "synonyms",
            Self::Description => "description",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::Improvement => "Improvement",
            Self::Synonyms => "Synonyms",
            Self::Description => "Description",
        }
    }

    fn system_prompt(&self) -> &'static str {
        match self {
            Self::Improvement => templates::IMPROVEMENT_PROMPT,
            Self::Synonyms => templates::SYNONYMS_PROMPT,
            Self::Description => templates::DESCRIPTION_PROMPT,
        }
    }

    pub fn conversation_kind(&self) -> ConversationKind {
        match self {
            Self::Improvement => ConversationKind::Improvement,
            Self::Synonyms => ConversationKind::Synonyms,
            Self::Description => ConversationKind::Description,
        }
    }
}

impl fmt::Display for AssistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssistKind {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "improvement" => Ok(Self::Improvement),
            "synonyms" => Ok(Self::Synonyms),
            "description" => Ok(Self::Description),
            _ => Err(ChatError::BadRequest("invalid query type".to_string())),
        }
    }
}

/// Single-shot text tools (improve, synonyms, describe)
///
/// Unlike chat turns, nothing reaches the client until the whole answer is
/// in, so store failures here are returned to the caller.
#[derive(Clone)]
pub struct TextAssistant {
    streamer: CompletionStreamer,
    ledger: ConversationLedger,
    model: String,
}

impl TextAssistant {
    /// `streamer` must not carry the chat system prompt; each tool brings its own
    pub fn new(streamer: CompletionStreamer, ledger: ConversationLedger, model: impl Into<String>) -> Self {
        Self {
            streamer,
            ledger,
            model: model.into(),
        }
    }

    pub async fn assist(&self, user_id: &str, request: AssistRequest) -> Result<String> {
        let kind: AssistKind = request.kind.parse()?;
        if request.text.trim().is_empty() {
            return Err(ChatError::BadRequest("text is required".to_string()));
        }
        let context = request.context.filter(|c| !c.is_empty());

        let messages = build_prompt(kind, &request.text, context.as_deref());
        let mut stream = self.streamer.open(messages, &self.model, false).await?;
        while let Some(batch) = stream.next_events().await {
            batch?;
        }
        let completion = stream.finish();

        if completion.content.is_empty() {
            return Err(ChatError::UpstreamStream("failed to get response".to_string()));
        }
        let suggestion = completion.content.replace("\\n", "\n");

        let title = truncate_with_ellipsis(
            &format!("{}: {}", kind.label(), request.text),
            ASSIST_TITLE_CHARS,
        );
        let conversation = self
            .ledger
            .create_conversation(user_id, &title, kind.conversation_kind())
            .await?;

        let mut user_message = format!("Type: {}\nText: {}", kind, request.text);
        if let Some(context) = &context {
            user_message.push_str(&format!("\nContext: {}", context));
        }

        self.ledger
            .append_turn(NewTurn {
                user_id: user_id.to_string(),
                conversation_id: conversation.id.clone(),
                user_message,
                response_message: suggestion.clone(),
                thinking_content: String::new(),
                model: self.model.clone(),
                usage: completion.usage,
            })
            .await?;
        self.ledger
            .accumulate_totals(&conversation.id, &completion.usage)
            .await?;

        tracing::info!(
            conversation_id = %conversation.id,
            kind = %kind,
            output_tokens = completion.usage.output_tokens,
            "Text assist completed"
        );
        Ok(suggestion)
    }
}

/// User prompts first, then the tool's system prompt
fn build_prompt(kind: AssistKind, text: &str, context: Option<&str>) -> Vec<Message> {
    let mut messages = Vec::new();
    match kind {
        AssistKind::Improvement => {
            if let Some(context) = context {
                messages.push(Message::human(format!(
                    "{}{}",
                    templates::IMPROVEMENT_CONTEXT_PREFIX,
                    context
                )));
            }
            messages.push(Message::human(format!("Selected Text: {}", text)));
        }
        AssistKind::Synonyms => messages.push(Message::human(format!("Word: {}", text))),
        AssistKind::Description => messages.push(Message::human(format!("Text: {}", text))),
    }
    messages.push(Message::system(kind.system_prompt()));
    messages
}
