use anyhow::Result;
use futures::{Stream, StreamExt};

use super::buffering::CircularLineBuffer;
use crate::streaming::CompletionChunk;
use crate::traits::ChunkStream;

/// Strategy for turning SSE `data:` payloads into completion chunks
pub trait SseLineParser: Send {
    /// Parse one data payload. `Ok(None)` means "nothing to emit".
    fn parse_data_line(&self, data: &str) -> Result<Option<CompletionChunk>>;

    /// Check if this payload signals end of stream
    fn is_done_marker(&self, data: &str) -> bool {
        data == "[DONE]"
    }
}

enum LineOutcome {
    Skip,
    Done,
    Chunk(CompletionChunk),
    Failed(anyhow::Error),
}

fn classify_line<P: SseLineParser>(parser: &P, line: &str) -> LineOutcome {
    // Blank separators, comments (": keep-alive") and non-data fields are ignored
    let Some(data) = line.strip_prefix("data:") else {
        return LineOutcome::Skip;
    };
    let data = data.trim_start();

    if parser.is_done_marker(data) {
        return LineOutcome::Done;
    }

    match parser.parse_data_line(data) {
        Ok(Some(chunk)) => LineOutcome::Chunk(chunk),
        Ok(None) => LineOutcome::Skip,
        Err(e) => LineOutcome::Failed(e),
    }
}

/// Generic SSE stream parser over any byte stream
///
/// Chunks are yielded in arrival order. The first error ends the stream.
pub fn parse_sse_stream<S, B, E, P>(bytes: S, parser: P) -> ChunkStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    P: SseLineParser + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(bytes);
        let mut buffer = CircularLineBuffer::with_capacity(4096);
        let mut drain_remainder = true;

        'read: while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    buffer.extend(bytes.as_ref());

                    while let Some(line_result) = buffer.next_line() {
                        let outcome = match line_result {
                            Ok(line) => classify_line(&parser, &line),
                            Err(e) => LineOutcome::Failed(e),
                        };
                        match outcome {
                            LineOutcome::Skip => continue,
                            LineOutcome::Done => {
                                drain_remainder = false;
                                break 'read;
                            }
                            LineOutcome::Chunk(chunk) => yield Ok(chunk),
                            LineOutcome::Failed(e) => {
                                drain_remainder = false;
                                yield Err(e);
                                break 'read;
                            }
                        }
                    }
                }
                Err(e) => {
                    drain_remainder = false;
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    break 'read;
                }
            }
        }

        // A final event may arrive without its trailing newline
        if drain_remainder {
            if let Some(Ok(line)) = buffer.take_remainder() {
                match classify_line(&parser, &line) {
                    LineOutcome::Chunk(chunk) => yield Ok(chunk),
                    LineOutcome::Failed(e) => yield Err(e),
                    LineOutcome::Skip | LineOutcome::Done => {}
                }
            }
        }
    })
}
