pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod openai;

pub use traits::{ChatClient, ChatRequest, ChatOptions, ChunkStream};

pub use streaming::{CompletionChunk, ChatStreamChunk, ChatChunkParser};
pub use buffer_utils::{CircularLineBuffer, SseLineParser, parse_sse_stream};
pub use openai::OpenAIClient;
pub use types::{Message, Role, TokenUsage, Cost};
