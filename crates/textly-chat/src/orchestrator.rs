use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::mpsc;

use textly_llm::Message;
use textly_persist::{
    Conversation, ConversationKind, ConversationLedger, ConversationMessage, NewTurn,
};

use crate::assist::{AssistRequest, TextAssistant};
use crate::error::{ChatError, Result};
use crate::events::TurnEvent;
use crate::locks::{ConversationLocks, TurnGuard};
use crate::streamer::CompletionStreamer;

/// Live event feed of one turn
pub type TurnStream = mpsc::Receiver<TurnEvent>;

const DEFAULT_TITLE_CHARS: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartConversation {
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContinueConversation {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditConversation {
    pub conversation_id: String,
    pub message_id: String,
    pub new_message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

/// A conversation with its current timeline
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationView {
    pub conversation: Conversation,
    pub messages: Vec<ConversationMessage>,
}

/// Everything turn-commit needs besides the history
struct PendingTurn {
    user_id: String,
    conversation_id: String,
    user_message: String,
    model: String,
    use_reasoning: bool,
}

/// Coordinates conversation actions: validates, builds model history,
/// streams the completion and commits the turn
///
/// Validation, ownership checks and history reads happen before a
/// [`TurnStream`] is returned, so those failures surface as plain errors.
/// Streaming and the commit run on a spawned task that keeps going when
/// the receiver is dropped.
#[derive(Clone)]
pub struct TurnOrchestrator {
    ledger: ConversationLedger,
    streamer: CompletionStreamer,
    assistant: TextAssistant,
    locks: Arc<ConversationLocks>,
    default_model: String,
    channel_capacity: usize,
}

impl TurnOrchestrator {
    pub(crate) fn new(
        ledger: ConversationLedger,
        streamer: CompletionStreamer,
        assistant: TextAssistant,
        default_model: String,
        channel_capacity: usize,
    ) -> Self {
        Self {
            ledger,
            streamer,
            assistant,
            locks: Arc::new(ConversationLocks::new()),
            default_model,
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn builder() -> crate::builder::TurnOrchestratorBuilder {
        crate::builder::TurnOrchestratorBuilder::new()
    }

    pub fn ledger(&self) -> &ConversationLedger {
        &self.ledger
    }

    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Requested model, or the configured default when absent or blank
    pub fn resolve_model(&self, requested: Option<&str>) -> String {
        match requested.map(str::trim) {
            Some(model) if !model.is_empty() => model.to_string(),
            _ => self.default_model.clone(),
        }
    }

    pub async fn start_conversation(&self, user_id: &str, request: StartConversation) -> Result<TurnStream> {
        require_text(&request.message, "message")?;

        let title = match request.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => truncate_with_ellipsis(&request.message, DEFAULT_TITLE_CHARS),
        };
        let conversation = self
            .ledger
            .create_conversation(user_id, &title, ConversationKind::Chat)
            .await?;

        tracing::info!(conversation_id = %conversation.id, user_id, "Conversation started");

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let _ = tx.send(TurnEvent::ConversationId(conversation.id.clone())).await;

        let guard = self.locks.acquire(&conversation.id).await;
        let history = vec![Message::human(request.message.clone())];
        let turn = PendingTurn {
            user_id: user_id.to_string(),
            conversation_id: conversation.id,
            user_message: request.message,
            model: self.resolve_model(request.model.as_deref()),
            use_reasoning: request.use_reasoning,
        };
        self.spawn_turn(turn, history, guard, tx);
        Ok(rx)
    }

    pub async fn continue_conversation(
        &self,
        user_id: &str,
        request: ContinueConversation,
    ) -> Result<TurnStream> {
        require_text(&request.message, "message")?;
        let conversation = self.owned_conversation(user_id, &request.conversation_id).await?;

        let guard = self.locks.acquire(&conversation.id).await;
        let turns = self.ledger.get_active_turns_ordered(&conversation.id).await?;
        let history = build_history(&turns, &request.message);

        let turn = PendingTurn {
            user_id: user_id.to_string(),
            conversation_id: conversation.id,
            user_message: request.message,
            model: self.resolve_model(request.model.as_deref()),
            use_reasoning: request.use_reasoning,
        };
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        self.spawn_turn(turn, history, guard, tx);
        Ok(rx)
    }

    /// Replace a past user message and regenerate from there
    ///
    /// The edited turn and everything after it is deactivated before the new
    /// completion starts.
    pub async fn edit_conversation(&self, user_id: &str, request: EditConversation) -> Result<TurnStream> {
        require_text(&request.new_message, "new_message")?;
        let conversation = self.owned_conversation(user_id, &request.conversation_id).await?;

        let target = self.ledger.get_message(&request.message_id).await?;
        if target.conversation_id != conversation.id {
            return Err(ChatError::BadRequest(
                "message does not belong to conversation".to_string(),
            ));
        }

        let guard = self.locks.acquire(&conversation.id).await;
        let invalidated = self
            .ledger
            .invalidate_from(&conversation.id, target.created, true)
            .await?;
        let turns = self.ledger.get_active_turns_ordered(&conversation.id).await?;
        let history = build_history(&turns, &request.new_message);

        tracing::info!(
            conversation_id = %conversation.id,
            message_id = %target.id,
            invalidated,
            "Editing conversation"
        );

        let turn = PendingTurn {
            user_id: user_id.to_string(),
            conversation_id: conversation.id,
            user_message: request.new_message,
            model: self.resolve_model(request.model.as_deref()),
            use_reasoning: request.use_reasoning,
        };
        let (tx, rx) = mpsc::channel(self.channel_capacity);
        self.spawn_turn(turn, history, guard, tx);
        Ok(rx)
    }

    pub async fn deactivate_conversation(&self, user_id: &str, conversation_id: &str) -> Result<()> {
        let conversation = self.owned_conversation(user_id, conversation_id).await?;
        self.ledger.deactivate(&conversation.id).await?;

        tracing::info!(conversation_id, "Conversation deactivated");
        Ok(())
    }

    pub async fn get_conversation_view(&self, user_id: &str, conversation_id: &str) -> Result<ConversationView> {
        let conversation = self.owned_conversation(user_id, conversation_id).await?;
        let messages = self.ledger.get_active_turns_ordered(&conversation.id).await?;
        Ok(ConversationView { conversation, messages })
    }

    /// Active conversations, newest first, optionally with their timelines
    pub async fn list_conversations(
        &self,
        user_id: &str,
        kind: Option<ConversationKind>,
        include_messages: bool,
    ) -> Result<Vec<ConversationView>> {
        let conversations = self.ledger.list_active_conversations(user_id, kind).await?;

        let mut views = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let messages = if include_messages {
                self.ledger.get_active_turns_ordered(&conversation.id).await?
            } else {
                Vec::new()
            };
            views.push(ConversationView { conversation, messages });
        }
        Ok(views)
    }

    /// One-off streamed answer over a client-supplied history; nothing is stored
    pub fn stateless_chat(&self, messages: Vec<Message>) -> Result<TurnStream> {
        if messages.is_empty() {
            return Err(ChatError::BadRequest("messages are required".to_string()));
        }

        let (tx, rx) = mpsc::channel(self.channel_capacity);
        let streamer = self.streamer.clone();
        let model = self.default_model.clone();
        tokio::spawn(async move {
            match streamer.forward(messages, &model, false, &tx).await {
                Ok(_) => {
                    let _ = tx.send(TurnEvent::Done).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stateless chat failed");
                    let _ = tx.send(TurnEvent::Error(e.to_string())).await;
                }
            }
        });
        Ok(rx)
    }

    /// Run a text tool and record it as a single-turn conversation
    pub async fn text_assist(&self, user_id: &str, request: AssistRequest) -> Result<String> {
        self.assistant.assist(user_id, request).await
    }

    async fn owned_conversation(&self, user_id: &str, conversation_id: &str) -> Result<Conversation> {
        let conversation = self.ledger.get_conversation(conversation_id).await?;
        if !conversation.is_owned_by(user_id) {
            tracing::warn!(conversation_id, user_id, "Conversation access denied");
            return Err(ChatError::Forbidden(format!("conversation {}", conversation_id)));
        }
        Ok(conversation)
    }

    fn spawn_turn(
        &self,
        turn: PendingTurn,
        history: Vec<Message>,
        guard: TurnGuard,
        events: mpsc::Sender<TurnEvent>,
    ) {
        let this = self.clone();
        tokio::spawn(async move {
            this.commit_turn(turn, history, &events).await;
            drop(guard);
            this.locks.prune_idle().await;
        });
    }

    /// Stream, then append the turn, announce its id and add its usage to the totals
    ///
    /// A failed stream commits nothing. Store failures after a good stream
    /// are logged and the turn still ends with `Done`.
    async fn commit_turn(&self, turn: PendingTurn, history: Vec<Message>, events: &mpsc::Sender<TurnEvent>) {
        let completion = match self
            .streamer
            .forward(history, &turn.model, turn.use_reasoning, events)
            .await
        {
            Ok(completion) => completion,
            Err(e) => {
                tracing::warn!(
                    conversation_id = %turn.conversation_id,
                    model = %turn.model,
                    error = %e,
                    "Completion failed; turn not committed"
                );
                let _ = events.send(TurnEvent::Error(e.to_string())).await;
                return;
            }
        };

        let usage = completion.usage;
        let new_turn = NewTurn {
            user_id: turn.user_id,
            conversation_id: turn.conversation_id.clone(),
            user_message: turn.user_message,
            response_message: completion.content,
            thinking_content: completion.reasoning,
            model: turn.model,
            usage,
        };

        match self.ledger.append_turn(new_turn).await {
            Ok(message) => {
                let _ = events.send(TurnEvent::MessageId(message.id)).await;
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = %turn.conversation_id,
                    error = %e,
                    "Failed to save conversation message"
                );
            }
        }

        if let Err(e) = self.ledger.accumulate_totals(&turn.conversation_id, &usage).await {
            tracing::error!(
                conversation_id = %turn.conversation_id,
                error = %e,
                "Failed to update conversation totals"
            );
        }

        tracing::info!(
            conversation_id = %turn.conversation_id,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            reasoning_tokens = usage.reasoning_tokens,
            cost = %usage.cost,
            "Turn committed"
        );
        let _ = events.send(TurnEvent::Done).await;
    }
}

/// Model input for the next turn: each active turn as a user/assistant
/// pair, oldest first, then the new user message
pub fn build_history(turns: &[ConversationMessage], next_message: &str) -> Vec<Message> {
    let mut history = Vec::with_capacity(turns.len() * 2 + 1);
    for turn in turns {
        history.push(Message::human(turn.user_message.clone()));
        history.push(Message::ai(turn.response_message.clone()));
    }
    history.push(Message::human(next_message));
    history
}

pub(crate) fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn require_text(value: &str, field: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(ChatError::BadRequest(format!("{} is required", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use textly_llm::Role;

    fn turn(user: &str, response: &str) -> ConversationMessage {
        NewTurn {
            user_message: user.to_string(),
            response_message: response.to_string(),
            ..Default::default()
        }
        .into_message(textly_persist::models::now_millis())
    }

    #[test]
    fn test_history_alternates_and_ends_with_user() {
        let turns = vec![turn("q1", "a1"), turn("q2", "a2"), turn("q3", "a3")];
        let history = build_history(&turns, "q4");

        assert_eq!(history.len(), 2 * turns.len() + 1);
        for (i, message) in history.iter().enumerate() {
            let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
            assert_eq!(message.role(), expected);
        }
        assert_eq!(history.last().map(Message::content), Some("q4"));
    }

    #[test]
    fn test_title_truncation() {
        assert_eq!(truncate_with_ellipsis("short", 50), "short");

        let long = "x".repeat(60);
        let title = truncate_with_ellipsis(&long, 50);
        assert_eq!(title.chars().count(), 50);
        assert!(title.ends_with("..."));

        // Counted in characters, not bytes
        let accents = "é".repeat(51);
        assert_eq!(truncate_with_ellipsis(&accents, 50).chars().count(), 50);
    }
}
