#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::stream;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use textly_chat::{StreamerConfig, TurnEvent, TurnOrchestrator, TurnStream};
use textly_llm::{ChatClient, ChatRequest, ChunkStream, CompletionChunk, Cost, TokenUsage};
use textly_persist::{
    Conversation, ConversationFilter, ConversationLedger, ConversationMessage, ConversationStore,
    ConversationUpdate, MemoryStore, MessageFilter, PersistError,
};

pub enum Step {
    Chunk(CompletionChunk),
    Fail(&'static str),
}

enum Script {
    Stream(Vec<Step>),
    Refuse(&'static str),
    Hang,
}

/// Chat client that replays pre-baked chunk sequences, one per call
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_stream(&self, steps: Vec<Step>) {
        self.scripts.lock().unwrap().push_back(Script::Stream(steps));
    }

    /// A plain answer: content fragments then a usage chunk
    pub fn push_answer(&self, fragments: &[&str], usage: TokenUsage) {
        let mut steps: Vec<Step> = fragments
            .iter()
            .map(|f| Step::Chunk(CompletionChunk::content(*f)))
            .collect();
        steps.push(Step::Chunk(CompletionChunk::usage(usage)));
        self.push_stream(steps);
    }

    pub fn push_refusal(&self, reason: &'static str) {
        self.scripts.lock().unwrap().push_back(Script::Refuse(reason));
    }

    pub fn push_hang(&self) {
        self.scripts.lock().unwrap().push_back(Script::Hang);
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream> {
        self.requests.lock().unwrap().push(request);
        let script = self
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Script::Stream(Vec::new()));

        match script {
            Script::Refuse(reason) => Err(anyhow!(reason)),
            Script::Hang => Ok(Box::pin(stream::pending::<Result<CompletionChunk>>())),
            Script::Stream(steps) => {
                let items: Vec<Result<CompletionChunk>> = steps
                    .into_iter()
                    .map(|step| match step {
                        Step::Chunk(chunk) => Ok(chunk),
                        Step::Fail(reason) => Err(anyhow!(reason)),
                    })
                    .collect();
                Ok(Box::pin(stream::iter(items)))
            }
        }
    }
}

/// Memory store whose message inserts can be made to fail
#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_message_inserts: AtomicBool,
}

impl FlakyStore {
    pub fn fail_message_inserts(&self, fail: bool) {
        self.fail_message_inserts.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ConversationStore for FlakyStore {
    async fn insert_conversation(&self, conversation: Conversation) -> textly_persist::Result<()> {
        self.inner.insert_conversation(conversation).await
    }

    async fn get_conversation(&self, id: &str) -> textly_persist::Result<Option<Conversation>> {
        self.inner.get_conversation(id).await
    }

    async fn list_conversations(
        &self,
        filter: &ConversationFilter,
    ) -> textly_persist::Result<Vec<Conversation>> {
        self.inner.list_conversations(filter).await
    }

    async fn update_conversation(
        &self,
        id: &str,
        update: ConversationUpdate,
    ) -> textly_persist::Result<bool> {
        self.inner.update_conversation(id, update).await
    }

    async fn insert_message(&self, message: ConversationMessage) -> textly_persist::Result<()> {
        if self.fail_message_inserts.load(Ordering::SeqCst) {
            return Err(PersistError::Database("write refused".to_string()));
        }
        self.inner.insert_message(message).await
    }

    async fn get_message(&self, id: &str) -> textly_persist::Result<Option<ConversationMessage>> {
        self.inner.get_message(id).await
    }

    async fn list_messages(
        &self,
        filter: &MessageFilter,
    ) -> textly_persist::Result<Vec<ConversationMessage>> {
        self.inner.list_messages(filter).await
    }

    async fn deactivate_messages_from(
        &self,
        conversation_id: &str,
        cutoff: DateTime<Utc>,
        inclusive: bool,
    ) -> textly_persist::Result<u64> {
        self.inner
            .deactivate_messages_from(conversation_id, cutoff, inclusive)
            .await
    }

    async fn latest_message_created(
        &self,
        conversation_id: &str,
    ) -> textly_persist::Result<Option<DateTime<Utc>>> {
        self.inner.latest_message_created(conversation_id).await
    }
}

pub const DEFAULT_MODEL: &str = "test/default-model";

pub fn orchestrator(client: Arc<ScriptedClient>, store: Arc<dyn ConversationStore>) -> TurnOrchestrator {
    TurnOrchestrator::builder()
        .chat_client(client)
        .ledger(ConversationLedger::new(store))
        .default_model(DEFAULT_MODEL)
        .streamer_config(StreamerConfig {
            temperature: Some(0.7),
            max_tokens: Some(4000),
            idle_timeout: Duration::from_millis(200),
        })
        .build()
        .unwrap()
}

pub fn usage(input: u64, output: u64, cost: &str) -> TokenUsage {
    TokenUsage {
        input_tokens: input,
        output_tokens: output,
        reasoning_tokens: 0,
        cost: Cost::parse_decimal(cost).unwrap(),
    }
}

/// Events of a turn up to its terminal one; the commit is done by then
pub async fn collect(mut rx: TurnStream) -> Vec<TurnEvent> {
    let mut events = Vec::new();
    while let Some(event) = rx.recv().await {
        let terminal = event.is_terminal();
        events.push(event);
        if terminal {
            break;
        }
    }
    events
}

pub fn conversation_id(events: &[TurnEvent]) -> String {
    match events.first() {
        Some(TurnEvent::ConversationId(id)) => id.clone(),
        other => panic!("expected conversation id first, got {:?}", other),
    }
}

pub fn message_id(events: &[TurnEvent]) -> Option<String> {
    events.iter().find_map(|e| match e {
        TurnEvent::MessageId(id) => Some(id.clone()),
        _ => None,
    })
}

pub fn content(events: &[TurnEvent]) -> String {
    events
        .iter()
        .filter_map(|e| match e {
            TurnEvent::Content(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
