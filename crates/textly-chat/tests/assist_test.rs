mod support;

use std::sync::Arc;

use support::*;
use textly_chat::{AssistRequest, ChatError};
use textly_llm::Role;
use textly_persist::{ConversationKind, MemoryStore};

fn request(kind: &str, text: &str, context: Option<&str>) -> AssistRequest {
    AssistRequest {
        kind: kind.to_string(),
        text: text.to_string(),
        context: context.map(str::to_string),
    }
}

#[tokio::test]
async fn test_synonyms_are_returned_and_recorded() {
    let client = ScriptedClient::new();
    let orchestrator = orchestrator(client.clone(), Arc::new(MemoryStore::new()));
    client.push_answer(&["large, ", "huge"], usage(30, 4, "0.0005"));

    let suggestion = orchestrator
        .text_assist("alice", request("synonyms", "big", None))
        .await
        .unwrap();
    assert_eq!(suggestion, "large, huge");

    let sent = &client.requests()[0];
    assert!(!sent.options.include_reasoning);
    assert_eq!(sent.messages[0].content(), "Word: big");
    assert_eq!(sent.messages.last().unwrap().role(), Role::System);

    let listed = orchestrator
        .list_conversations("alice", Some(ConversationKind::Synonyms), true)
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);
    let view = &listed[0];
    assert_eq!(view.conversation.title, "Synonyms: big");
    assert_eq!(view.conversation.totals.total_requests, 1);
    assert_eq!(view.conversation.totals.input_tokens, 30);
    assert_eq!(view.messages[0].user_message, "Type: synonyms\nText: big");
    assert_eq!(view.messages[0].model, DEFAULT_MODEL);
}

#[tokio::test]
async fn test_improvement_records_context_and_unescapes_newlines() {
    let client = ScriptedClient::new();
    let orchestrator = orchestrator(client.clone(), Arc::new(MemoryStore::new()));
    client.push_answer(&["The cat sat.\\nIt purred."], usage(50, 8, "0.001"));

    let suggestion = orchestrator
        .text_assist("alice", request("improvement", "teh cat sat", Some("A story")))
        .await
        .unwrap();
    assert_eq!(suggestion, "The cat sat.\nIt purred.");

    let listed = orchestrator
        .list_conversations("alice", Some(ConversationKind::Improvement), true)
        .await
        .unwrap();
    assert_eq!(
        listed[0].messages[0].user_message,
        "Type: improvement\nText: teh cat sat\nContext: A story"
    );
}

#[tokio::test]
async fn test_long_text_title_is_truncated() {
    let client = ScriptedClient::new();
    let orchestrator = orchestrator(client.clone(), Arc::new(MemoryStore::new()));
    client.push_answer(&["summary"], usage(1, 1, "0"));

    let text = "a".repeat(200);
    orchestrator
        .text_assist("alice", request("description", &text, None))
        .await
        .unwrap();

    let listed = orchestrator.list_conversations("alice", None, false).await.unwrap();
    let title = &listed[0].conversation.title;
    assert_eq!(title.chars().count(), 100);
    assert!(title.starts_with("Description: aaa"));
    assert!(title.ends_with("..."));
}

#[tokio::test]
async fn test_empty_suggestion_is_an_upstream_error() {
    let client = ScriptedClient::new();
    let orchestrator = orchestrator(client.clone(), Arc::new(MemoryStore::new()));
    client.push_answer(&[], usage(5, 0, "0"));

    let result = orchestrator
        .text_assist("alice", request("description", "text", None))
        .await;
    assert!(matches!(result, Err(ChatError::UpstreamStream(_))));
    assert!(orchestrator.list_conversations("alice", None, false).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_type_is_rejected_before_calling_the_provider() {
    let client = ScriptedClient::new();
    let orchestrator = orchestrator(client.clone(), Arc::new(MemoryStore::new()));

    let result = orchestrator.text_assist("alice", request("poem", "x", None)).await;
    assert!(matches!(result, Err(ChatError::BadRequest(_))));
    assert!(client.requests().is_empty());
}
