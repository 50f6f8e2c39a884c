use anyhow::Result;
use std::collections::VecDeque;

/// Byte buffer that yields complete lines as network chunks arrive
///
/// A chunk boundary can fall anywhere, including inside a multi-byte UTF-8
/// sequence, so bytes are only decoded once a full line is present.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract the next `\n`-terminated line, trimmed
    ///
    /// Returns None if no complete line is available yet.
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(decode_line(&line_bytes))
    }

    /// Take whatever is left once the byte stream has ended
    pub fn take_remainder(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        let rest: Vec<u8> = self.buffer.drain(..).collect();
        Some(decode_line(&rest))
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

fn decode_line(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|line| line.trim().to_string())
        .map_err(|e| anyhow::anyhow!("Invalid UTF-8 in stream line: {}", e))
}
