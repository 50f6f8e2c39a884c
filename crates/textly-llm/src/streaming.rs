use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::buffer_utils::SseLineParser;
use crate::types::{Cost, TokenUsage};

/// One provider delta, normalized
///
/// Every field is optional: most chunks carry a content or reasoning
/// fragment, and usage typically only shows up on the last one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl CompletionChunk {
    pub fn content(text: impl Into<String>) -> Self {
        Self {
            content: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn usage(usage: TokenUsage) -> Self {
        Self {
            usage: Some(usage),
            ..Default::default()
        }
    }

    pub fn with_usage(mut self, usage: TokenUsage) -> Self {
        self.usage = Some(usage);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.reasoning.is_none() && self.usage.is_none()
    }
}

// ============================================================================
// OPENAI-COMPATIBLE WIRE TYPES (chat.completion.chunk)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ChatStreamChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<StreamChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: Delta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Delta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Vendor extension (OpenRouter style)
    #[serde(default)]
    pub reasoning: Option<String>,
    /// Vendor extension (DeepSeek style)
    #[serde(default)]
    pub reasoning_content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens: Option<u64>,
    #[serde(default)]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
    /// Vendor extension; opaque, see [`Cost::from_extension`]
    #[serde(default)]
    pub cost: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<u64>,
}

impl From<&WireUsage> for TokenUsage {
    fn from(usage: &WireUsage) -> Self {
        TokenUsage {
            input_tokens: usage.prompt_tokens.unwrap_or(0),
            output_tokens: usage.completion_tokens.unwrap_or(0),
            reasoning_tokens: usage
                .completion_tokens_details
                .as_ref()
                .and_then(|d| d.reasoning_tokens)
                .unwrap_or(0),
            cost: Cost::from_extension(usage.cost.as_ref()),
        }
    }
}

fn non_empty(text: &Option<String>) -> Option<String> {
    text.as_ref().filter(|s| !s.is_empty()).cloned()
}

impl ChatStreamChunk {
    pub fn to_completion_chunk(&self) -> CompletionChunk {
        let delta = self.choices.first().map(|c| &c.delta);

        CompletionChunk {
            content: delta.and_then(|d| non_empty(&d.content)),
            reasoning: delta.and_then(|d| non_empty(&d.reasoning).or_else(|| non_empty(&d.reasoning_content))),
            usage: self.usage.as_ref().map(TokenUsage::from),
        }
    }
}

/// Parses `chat.completion.chunk` payloads from OpenAI-compatible providers
#[derive(Debug, Clone, Copy, Default)]
pub struct ChatChunkParser;

impl SseLineParser for ChatChunkParser {
    fn parse_data_line(&self, data: &str) -> Result<Option<CompletionChunk>> {
        let value: serde_json::Value = serde_json::from_str(data)
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;

        // Providers report mid-stream failures as an error object on the data line
        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            anyhow::bail!("Provider error mid-stream: {}", message);
        }

        let chunk: ChatStreamChunk = serde_json::from_value(value)
            .map_err(|e| anyhow::anyhow!("Failed to parse chat chunk: {}", e))?;
        let normalized = chunk.to_completion_chunk();

        Ok((!normalized.is_empty()).then_some(normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_delta() {
        let data = r#"{"id":"gen-1","choices":[{"index":0,"delta":{"role":"assistant","content":"Hel"},"finish_reason":null}]}"#;
        let chunk = ChatChunkParser.parse_data_line(data).unwrap().unwrap();
        assert_eq!(chunk.content.as_deref(), Some("Hel"));
        assert!(chunk.reasoning.is_none());
        assert!(chunk.usage.is_none());
    }

    #[test]
    fn test_parse_reasoning_delta() {
        let data = r#"{"choices":[{"delta":{"content":"","reasoning":"Let me think"}}]}"#;
        let chunk = ChatChunkParser.parse_data_line(data).unwrap().unwrap();
        assert!(chunk.content.is_none());
        assert_eq!(chunk.reasoning.as_deref(), Some("Let me think"));

        let data = r#"{"choices":[{"delta":{"reasoning_content":"step 1"}}]}"#;
        let chunk = ChatChunkParser.parse_data_line(data).unwrap().unwrap();
        assert_eq!(chunk.reasoning.as_deref(), Some("step 1"));
    }

    #[test]
    fn test_parse_usage_with_cost() {
        let data = r#"{"choices":[],"usage":{"prompt_tokens":5,"completion_tokens":2,"completion_tokens_details":{"reasoning_tokens":1},"cost":0.001}}"#;
        let chunk = ChatChunkParser.parse_data_line(data).unwrap().unwrap();
        let usage = chunk.usage.unwrap();
        assert_eq!(usage.input_tokens, 5);
        assert_eq!(usage.output_tokens, 2);
        assert_eq!(usage.reasoning_tokens, 1);
        assert_eq!(usage.cost, Cost::from_micros(1_000));
    }

    #[test]
    fn test_parse_usage_with_unparseable_cost() {
        let data = r#"{"choices":[],"usage":{"prompt_tokens":5,"completion_tokens":null,"cost":"unknown"}}"#;
        let usage = ChatChunkParser.parse_data_line(data).unwrap().unwrap().usage.unwrap();
        assert_eq!(usage.output_tokens, 0);
        assert_eq!(usage.cost, Cost::ZERO);
    }

    #[test]
    fn test_empty_delta_yields_nothing() {
        let data = r#"{"choices":[{"delta":{"content":""},"finish_reason":"stop"}]}"#;
        assert!(ChatChunkParser.parse_data_line(data).unwrap().is_none());
    }

    #[test]
    fn test_error_payload_is_an_error() {
        let data = r#"{"error":{"message":"Rate limited","code":429}}"#;
        let err = ChatChunkParser.parse_data_line(data).unwrap_err();
        assert!(err.to_string().contains("Rate limited"));
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(ChatChunkParser.parse_data_line("{not json").is_err());
    }
}
