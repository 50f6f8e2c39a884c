use textly_llm::{CompletionChunk, TokenUsage};

use crate::events::TurnEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Reasoning,
    Content,
}

/// Everything a finished completion hands back
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub content: String,
    pub reasoning: String,
    pub usage: TokenUsage,
}

/// Folds provider chunks into client events and the final completion
///
/// Tracks the reasoning-to-content transition so `Thinking(false)` is
/// emitted once, on the first content fragment after reasoning. Reasoning
/// is dropped entirely when it was not requested.
pub struct CompletionAccumulator {
    reasoning_requested: bool,
    phase: Phase,
    content: String,
    reasoning: String,
    usage: Option<TokenUsage>,
}

impl CompletionAccumulator {
    pub fn new(reasoning_requested: bool) -> Self {
        Self {
            reasoning_requested,
            phase: Phase::Idle,
            content: String::new(),
            reasoning: String::new(),
            usage: None,
        }
    }

    /// Accumulate one chunk and return the events to forward, in order
    pub fn push(&mut self, chunk: CompletionChunk) -> Vec<TurnEvent> {
        let mut events = Vec::new();

        let requested = self.reasoning_requested;
        if let Some(reasoning) = chunk.reasoning.filter(|r| requested && !r.is_empty()) {
            if self.phase == Phase::Idle {
                events.push(TurnEvent::Thinking(true));
                self.phase = Phase::Reasoning;
            }
            self.reasoning.push_str(&reasoning);
            events.push(TurnEvent::ThinkingContent(reasoning));
        }

        if let Some(content) = chunk.content.filter(|c| !c.is_empty()) {
            if self.phase == Phase::Reasoning {
                events.push(TurnEvent::Thinking(false));
            }
            self.phase = Phase::Content;
            self.content.push_str(&content);
            events.push(TurnEvent::Content(content));
        }

        if let Some(usage) = chunk.usage {
            if usage.has_token_counts() {
                self.usage = Some(usage);
            }
        }

        events
    }

    pub fn finish(self) -> Completion {
        Completion {
            content: self.content,
            reasoning: self.reasoning,
            usage: self.usage.unwrap_or_default(),
        }
    }
}
