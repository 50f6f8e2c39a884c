use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use futures::stream;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use textly_api::{config::Config, routes::build_router, state::AppState};
use textly_chat::{StreamerConfig, TurnOrchestrator};
use textly_llm::{ChatClient, ChatRequest, ChunkStream, CompletionChunk, Cost, TokenUsage};
use textly_persist::PersistClient;

/// Answers every call with the same two fragments and a usage snapshot
struct EchoClient;

#[async_trait]
impl ChatClient for EchoClient {
    async fn chat_stream(&self, _request: ChatRequest) -> anyhow::Result<ChunkStream> {
        let usage = TokenUsage {
            input_tokens: 12,
            output_tokens: 3,
            reasoning_tokens: 0,
            cost: Cost::parse_decimal("0.0015").unwrap(),
        };
        let chunks = vec![
            Ok(CompletionChunk::content("Hello")),
            Ok(CompletionChunk::content("\nworld")),
            Ok(CompletionChunk::usage(usage)),
        ];
        Ok(Box::pin(stream::iter(chunks)))
    }
}

fn app() -> Router {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config/default.toml");
    let config = Config::from_file(path).unwrap();

    let persist = PersistClient::in_memory();
    let orchestrator = TurnOrchestrator::builder()
        .chat_client(Arc::new(EchoClient))
        .ledger(persist.ledger().clone())
        .default_model(&config.llm.default_model)
        .streamer_config(StreamerConfig {
            temperature: Some(0.7),
            max_tokens: Some(4000),
            idle_timeout: Duration::from_secs(5),
        })
        .build()
        .unwrap();

    build_router(Arc::new(AppState::new(config, persist, orchestrator)))
}

fn request(method: &str, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_str(&body).unwrap())
}

/// `data:` payloads of an event-stream body
fn payloads(body: &str) -> Vec<String> {
    body.split("\n\n")
        .filter_map(|frame| frame.strip_prefix("data: "))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn test_health_needs_no_user() {
    let app = app();
    let (status, body) = send_json(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_missing_user_header_is_unauthorized() {
    let app = app();
    let (status, body) = send_json(&app, request("GET", "/conversations", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains("x-user-id"));

    let (status, _) = send(&app, request("GET", "/conversations", Some("  "), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_start_streams_then_conversation_is_listed() {
    let app = app();
    let (status, body) = send(
        &app,
        request("POST", "/conversations/start", Some("alice"), Some(json!({"message": "Hi"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let frames = payloads(&body);
    let first: Value = serde_json::from_str(&frames[0]).unwrap();
    let conversation_id = first["conversation_id"].as_str().unwrap().to_string();
    assert_eq!(frames[1], "Hello");
    assert_eq!(frames[2], "\\nworld");
    assert!(frames[3].starts_with("{\"message_id\":"));
    assert_eq!(frames.last().map(String::as_str), Some("[DONE]"));

    let uri = format!("/conversations/{}", conversation_id);
    let (status, conversation) = send_json(&app, request("GET", &uri, Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(conversation["type"], "chat");
    assert_eq!(conversation["total_requests"], 1);
    assert_eq!(conversation["input_tokens"], 12);
    assert_eq!(conversation["cost"], 0.0015);
    assert_eq!(conversation["messages"][0]["response_message"], "Hello\nworld");

    let (_, listed) = send_json(&app, request("GET", "/conversations?type=chat", Some("alice"), None)).await;
    assert_eq!(listed["conversations"].as_array().unwrap().len(), 1);
    assert!(listed["conversations"][0].get("messages").is_none());

    let (status, _) = send(&app, request("GET", &uri, Some("mallory"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_errors_before_streaming_are_plain_json() {
    let app = app();
    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/conversations/continue",
            Some("alice"),
            Some(json!({"conversation_id": "missing", "message": "hi"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        request("POST", "/conversations/start", Some("alice"), Some(json!({"message": ""}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, request("GET", "/conversations?type=poetry", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivate_returns_success_message() {
    let app = app();
    let (_, body) = send(
        &app,
        request("POST", "/conversations/start", Some("alice"), Some(json!({"message": "Hi"}))),
    )
    .await;
    let first: Value = serde_json::from_str(&payloads(&body)[0]).unwrap();

    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/conversations/deactivate",
            Some("alice"),
            Some(json!({"conversation_id": first["conversation_id"]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"success": true, "message": "Conversation deactivated successfully"})
    );

    let (_, listed) = send_json(&app, request("GET", "/conversations", Some("alice"), None)).await;
    assert!(listed["conversations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_assist_and_models() {
    let app = app();
    let (status, body) = send_json(
        &app,
        request(
            "POST",
            "/ai/assist",
            Some("alice"),
            Some(json!({"type": "synonyms", "text": "big"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["suggestion"], "Hello\nworld");

    let (status, _) = send(
        &app,
        request("POST", "/ai/assist", Some("alice"), Some(json!({"type": "poem", "text": "x"}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send_json(&app, request("GET", "/ai/models", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["models"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn test_stateless_chat_streams_content() {
    let app = app();
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/ai/chat",
            Some("alice"),
            Some(json!({"messages": [{"role": "user", "content": "hi"}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(payloads(&body), vec!["Hello", "\\nworld", "[DONE]"]);

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/ai/chat",
            Some("alice"),
            Some(json!({"messages": [{"role": "robot", "content": "hi"}]})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_document_moves_are_cycle_checked() {
    let app = app();
    let create = |name: &str, parent: Option<&str>| {
        request(
            "POST",
            "/documents",
            Some("alice"),
            Some(json!({"name": name, "parent": parent, "is_folder": true})),
        )
    };

    let (status, root) = send_json(&app, create("root", None)).await;
    assert_eq!(status, StatusCode::CREATED);
    let root_id = root["id"].as_str().unwrap().to_string();
    let (_, child) = send_json(&app, create("child", Some(&root_id))).await;
    let child_id = child["id"].as_str().unwrap().to_string();
    assert_eq!(child["parent"], root_id.as_str());

    let uri = format!("/documents/{}", root_id);
    let (status, body) = send_json(
        &app,
        request("PATCH", &uri, Some("alice"), Some(json!({"parent": child_id}))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Circular reference"));

    let uri = format!("/documents/{}", child_id);
    let (status, body) = send_json(
        &app,
        request("PATCH", &uri, Some("alice"), Some(json!({"parent": null}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["parent"].is_null());

    let (status, _) = send(&app, request("GET", &uri, Some("mallory"), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, create("orphan", Some("missing"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = app();
    let (status, body) = send_json(&app, request("GET", "/api/openapi.json", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/conversations/start"].is_object());
    assert!(body["paths"]["/documents/{document_id}"].is_object());
}
