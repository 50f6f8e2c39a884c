pub mod error;
pub mod events;
pub mod accumulator;
pub mod streamer;
pub mod locks;
pub mod orchestrator;
pub mod assist;
pub mod templates;
pub mod builder;

pub use error::{ChatError, Result};
pub use events::TurnEvent;
pub use accumulator::{Completion, CompletionAccumulator};
pub use streamer::{CompletionStream, CompletionStreamer, StreamerConfig};
pub use locks::ConversationLocks;
pub use orchestrator::{
    build_history, ContinueConversation, ConversationView, EditConversation, StartConversation,
    TurnOrchestrator, TurnStream,
};
pub use assist::{AssistKind, AssistRequest, TextAssistant};
pub use builder::TurnOrchestratorBuilder;
