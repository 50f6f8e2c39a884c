use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use textly_llm::{ChatClient, ChatOptions, ChatRequest, ChunkStream, Message};

use crate::accumulator::{Completion, CompletionAccumulator};
use crate::error::{ChatError, Result};
use crate::events::TurnEvent;

/// Provider call parameters shared by every completion
#[derive(Debug, Clone)]
pub struct StreamerConfig {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Longest wait for the response head or for the next chunk
    pub idle_timeout: Duration,
}

impl Default for StreamerConfig {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            max_tokens: Some(4000),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

/// Drives single streamed completions against a [`ChatClient`]
#[derive(Clone)]
pub struct CompletionStreamer {
    client: Arc<dyn ChatClient>,
    system_prompt: Option<String>,
    config: StreamerConfig,
}

impl CompletionStreamer {
    pub fn new(client: Arc<dyn ChatClient>, config: StreamerConfig) -> Self {
        Self {
            client,
            system_prompt: None,
            config,
        }
    }

    /// Prepend this system message to every history
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Start the provider call and hand back the unconsumed sequence
    pub async fn open(
        &self,
        history: Vec<Message>,
        model: &str,
        reasoning_requested: bool,
    ) -> Result<CompletionStream> {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt.clone()));
        }
        messages.extend(history);

        let mut options = ChatOptions::new()
            .include_usage(true)
            .include_reasoning(reasoning_requested);
        if let Some(temperature) = self.config.temperature {
            options = options.temperature(temperature);
        }
        if let Some(max_tokens) = self.config.max_tokens {
            options = options.max_tokens(max_tokens);
        }
        let request = ChatRequest::new(model, messages).with_options(options);

        tracing::debug!(model, reasoning_requested, messages = request.messages.len(), "Opening completion stream");

        let chunks = tokio::time::timeout(self.config.idle_timeout, self.client.chat_stream(request))
            .await
            .map_err(|_| timeout_error(self.config.idle_timeout))?
            .map_err(|e| ChatError::UpstreamStream(format!("{:#}", e)))?;

        Ok(CompletionStream {
            chunks,
            accumulator: CompletionAccumulator::new(reasoning_requested),
            idle_timeout: self.config.idle_timeout,
        })
    }

    /// Stream a completion to `events` while accumulating it
    ///
    /// Send failures are ignored: a client that went away does not stop the
    /// provider stream, which is drained so the turn can still be committed.
    pub async fn forward(
        &self,
        history: Vec<Message>,
        model: &str,
        reasoning_requested: bool,
        events: &mpsc::Sender<TurnEvent>,
    ) -> Result<Completion> {
        let mut stream = self.open(history, model, reasoning_requested).await?;
        while let Some(batch) = stream.next_events().await {
            for event in batch? {
                let _ = events.send(event).await;
            }
        }
        Ok(stream.finish())
    }
}

/// A provider sequence being consumed, plus what has been accumulated so far
///
/// Consumed exactly once. Dropping it before the end discards the partial
/// accumulation.
pub struct CompletionStream {
    chunks: ChunkStream,
    accumulator: CompletionAccumulator,
    idle_timeout: Duration,
}

impl CompletionStream {
    /// Events for the next chunk; `None` once the provider ends the stream
    pub async fn next_events(&mut self) -> Option<Result<Vec<TurnEvent>>> {
        match tokio::time::timeout(self.idle_timeout, self.chunks.next()).await {
            Err(_) => Some(Err(timeout_error(self.idle_timeout))),
            Ok(None) => None,
            Ok(Some(Err(e))) => Some(Err(ChatError::UpstreamStream(format!("{:#}", e)))),
            Ok(Some(Ok(chunk))) => Some(Ok(self.accumulator.push(chunk))),
        }
    }

    /// Final content, reasoning and usage
    pub fn finish(self) -> Completion {
        self.accumulator.finish()
    }
}

fn timeout_error(after: Duration) -> ChatError {
    ChatError::UpstreamStream(format!("provider sent nothing for {}s", after.as_secs()))
}
