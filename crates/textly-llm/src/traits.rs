use crate::streaming::CompletionChunk;
use crate::types::Message;
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazy, finite sequence of completion deltas in provider order
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<CompletionChunk>> + Send>>;

/// Trait for streaming chat completions
///
/// Implementations are constructed explicitly and shared behind an `Arc`;
/// there is no process-wide client handle.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Open a streaming chat completion
    ///
    /// Errors returned here mean the call never started (connection refused,
    /// non-2xx status). Errors yielded by the stream happened mid-flight.
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream>;
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            model: model.into(),
            messages,
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Vendor extension: ask the provider to stream reasoning deltas
    pub include_reasoning: bool,
    /// Ask for a usage snapshot on the final chunk
    pub include_usage: bool,
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    pub fn include_reasoning(mut self, enabled: bool) -> Self {
        self.include_reasoning = enabled;
        self
    }

    pub fn include_usage(mut self, enabled: bool) -> Self {
        self.include_usage = enabled;
        self
    }
}
