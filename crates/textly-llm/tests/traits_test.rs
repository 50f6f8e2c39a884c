use textly_llm::{ChatOptions, ChatRequest, Message, Role};

#[test]
fn test_chat_request_creation() {
    let messages = vec![Message::human("Hello")];
    let request = ChatRequest::new("openai/gpt-4o", messages);

    assert_eq!(request.model, "openai/gpt-4o");
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.options, ChatOptions::default());
}

#[test]
fn test_chat_request_with_options() {
    let options = ChatOptions::new()
        .temperature(0.7)
        .max_tokens(4000)
        .include_usage(true)
        .include_reasoning(true);

    let request = ChatRequest::new("m", vec![Message::human("Hello")]).with_options(options);

    assert_eq!(request.options.temperature, Some(0.7));
    assert_eq!(request.options.max_tokens, Some(4000));
    assert!(request.options.include_usage);
    assert!(request.options.include_reasoning);
}

#[test]
fn test_message_roles() {
    assert_eq!(Message::system("s").role(), Role::System);
    assert_eq!(Message::human("u").role(), Role::User);
    assert_eq!(Message::ai("a").role(), Role::Assistant);
}
