use anyhow::{anyhow, Result};
use std::sync::Arc;

use textly_llm::ChatClient;
use textly_persist::ConversationLedger;

use crate::assist::TextAssistant;
use crate::orchestrator::TurnOrchestrator;
use crate::streamer::{CompletionStreamer, StreamerConfig};
use crate::templates;

/// Builder for a [`TurnOrchestrator`]
pub struct TurnOrchestratorBuilder {
    client: Option<Arc<dyn ChatClient>>,
    ledger: Option<ConversationLedger>,
    default_model: Option<String>,
    config: StreamerConfig,
    system_prompt: String,
    channel_capacity: usize,
}

impl TurnOrchestratorBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            ledger: None,
            default_model: None,
            config: StreamerConfig::default(),
            system_prompt: templates::assistant_system_prompt(),
            channel_capacity: 256,
        }
    }

    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    pub fn ledger(mut self, ledger: ConversationLedger) -> Self {
        self.ledger = Some(ledger);
        self
    }

    /// Model used when a request names none
    pub fn default_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = Some(model.into());
        self
    }

    pub fn streamer_config(mut self, config: StreamerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Events buffered per turn before the producer waits on the client
    pub fn channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn build(self) -> Result<TurnOrchestrator> {
        let client = self.client.ok_or_else(|| anyhow!("Chat client is required"))?;
        let ledger = self.ledger.ok_or_else(|| anyhow!("Conversation ledger is required"))?;
        let default_model = self
            .default_model
            .filter(|m| !m.trim().is_empty())
            .ok_or_else(|| anyhow!("Default model is required"))?;

        let chat_streamer = CompletionStreamer::new(client.clone(), self.config.clone())
            .with_system_prompt(self.system_prompt);
        let assist_streamer = CompletionStreamer::new(client, self.config);
        let assistant = TextAssistant::new(assist_streamer, ledger.clone(), default_model.clone());

        Ok(TurnOrchestrator::new(
            ledger,
            chat_streamer,
            assistant,
            default_model,
            self.channel_capacity,
        ))
    }
}

impl Default for TurnOrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
