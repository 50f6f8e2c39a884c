// OpenAI-compatible client (OpenAI, OpenRouter and friends)

use crate::buffer_utils::parse_sse_stream;
use crate::streaming::ChatChunkParser;
use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChunkStream};
use crate::types::Message;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde_json::{Map, Value};
use std::time::Duration;

const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// OpenAI-compatible client (HTTP direct, no SDK)
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    /// Create new client with API key against the default OpenAI endpoint
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    /// Create new client against any OpenAI-compatible base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build streaming chat completion request payload
    pub(crate) fn build_chat_request(
        model: &str,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<Value> {
        let mut request = Map::new();
        request.insert("model".to_string(), Value::from(model));
        request.insert("messages".to_string(), serde_json::to_value(messages)?);
        request.insert("stream".to_string(), Value::Bool(true));

        if let Some(temp) = options.temperature {
            request.insert("temperature".to_string(), serde_json::json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            request.insert("max_tokens".to_string(), serde_json::json!(max_tokens));
        }
        if options.include_usage {
            request.insert(
                "stream_options".to_string(),
                serde_json::json!({ "include_usage": true }),
            );
        }
        // Sent either way so providers that default to streaming reasoning stay quiet
        request.insert(
            "include_reasoning".to_string(),
            Value::Bool(options.include_reasoning),
        );

        Ok(Value::Object(request))
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat_stream(&self, request: ChatRequest) -> Result<ChunkStream> {
        let payload = Self::build_chat_request(&request.model, &request.messages, &request.options)?;

        tracing::debug!(
            model = %request.model,
            messages = request.messages.len(),
            include_reasoning = request.options.include_reasoning,
            "Opening chat completion stream"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Provider API error ({}): {}", status, error_text);
        }

        Ok(parse_sse_stream(response.bytes_stream(), ChatChunkParser))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_chat_request_flags() {
        let messages = vec![Message::system("rules"), Message::human("Hi")];
        let options = ChatOptions::new()
            .temperature(0.7)
            .max_tokens(4000)
            .include_usage(true)
            .include_reasoning(true);

        let payload = OpenAIClient::build_chat_request("openai/gpt-4o", &messages, &options).unwrap();

        assert_eq!(payload["model"], "openai/gpt-4o");
        assert_eq!(payload["stream"], true);
        assert_eq!(payload["max_tokens"], 4000);
        assert_eq!(payload["stream_options"]["include_usage"], true);
        assert_eq!(payload["include_reasoning"], true);
        assert_eq!(payload["messages"][0]["role"], "system");
        assert_eq!(payload["messages"][1]["content"], "Hi");
    }

    #[test]
    fn test_build_chat_request_minimal() {
        let payload =
            OpenAIClient::build_chat_request("m", &[Message::human("x")], &ChatOptions::default()).unwrap();

        assert!(payload.get("temperature").is_none());
        assert!(payload.get("stream_options").is_none());
        assert_eq!(payload["include_reasoning"], false);
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let client = OpenAIClient::with_base_url("key", "https://openrouter.ai/api/v1/").unwrap();
        assert_eq!(client.base_url(), "https://openrouter.ai/api/v1");
    }
}
