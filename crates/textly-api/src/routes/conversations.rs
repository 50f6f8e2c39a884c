use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};

use textly_chat::{ContinueConversation, EditConversation, StartConversation};
use textly_persist::ConversationKind;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    handlers::stream::sse_response,
    models::{ConversationListResponse, ConversationResponse, ErrorResponse, SuccessResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct StartConversationRequest {
    pub message: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ContinueConversationRequest {
    pub conversation_id: String,
    pub message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EditConversationRequest {
    pub conversation_id: String,
    pub message_id: String,
    pub new_message: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub use_reasoning: bool,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeactivateConversationRequest {
    pub conversation_id: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListConversationsQuery {
    /// chat, improvement, synonyms or description
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub include_messages: bool,
}

/// Start a conversation and stream the first answer
#[utoipa::path(
    post,
    path = "/conversations/start",
    request_body = StartConversationRequest,
    responses(
        (status = 200, description = "Turn events", content_type = "text/event-stream"),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 401, description = "No user")
    ),
    tag = "conversations"
)]
pub async fn start_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<StartConversationRequest>,
) -> ApiResult<impl IntoResponse> {
    let events = state
        .orchestrator
        .start_conversation(
            &user_id,
            StartConversation {
                message: req.message,
                title: req.title,
                model: req.model,
                use_reasoning: req.use_reasoning,
            },
        )
        .await?;
    Ok(sse_response(events))
}

/// Append a turn to an existing conversation
#[utoipa::path(
    post,
    path = "/conversations/continue",
    request_body = ContinueConversationRequest,
    responses(
        (status = 200, description = "Turn events", content_type = "text/event-stream"),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn continue_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<ContinueConversationRequest>,
) -> ApiResult<impl IntoResponse> {
    let events = state
        .orchestrator
        .continue_conversation(
            &user_id,
            ContinueConversation {
                conversation_id: req.conversation_id,
                message: req.message,
                model: req.model,
                use_reasoning: req.use_reasoning,
            },
        )
        .await?;
    Ok(sse_response(events))
}

/// Replace a past user message and regenerate from it
#[utoipa::path(
    post,
    path = "/conversations/edit",
    request_body = EditConversationRequest,
    responses(
        (status = 200, description = "Turn events", content_type = "text/event-stream"),
        (status = 400, description = "Message is not part of the conversation", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Conversation or message not found", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn edit_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<EditConversationRequest>,
) -> ApiResult<impl IntoResponse> {
    let events = state
        .orchestrator
        .edit_conversation(
            &user_id,
            EditConversation {
                conversation_id: req.conversation_id,
                message_id: req.message_id,
                new_message: req.new_message,
                model: req.model,
                use_reasoning: req.use_reasoning,
            },
        )
        .await?;
    Ok(sse_response(events))
}

#[utoipa::path(
    post,
    path = "/conversations/deactivate",
    request_body = DeactivateConversationRequest,
    responses(
        (status = 200, description = "Conversation hidden", body = SuccessResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn deactivate_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<DeactivateConversationRequest>,
) -> ApiResult<Json<SuccessResponse>> {
    state
        .orchestrator
        .deactivate_conversation(&user_id, &req.conversation_id)
        .await?;

    Ok(Json(SuccessResponse {
        success: true,
        message: "Conversation deactivated successfully".to_string(),
    }))
}

/// A conversation with its active turns, oldest first
#[utoipa::path(
    get,
    path = "/conversations/{conversation_id}",
    params(("conversation_id" = String, Path, description = "Conversation id")),
    responses(
        (status = 200, description = "Conversation", body = ConversationResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Conversation not found", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(conversation_id): Path<String>,
) -> ApiResult<Json<ConversationResponse>> {
    let view = state
        .orchestrator
        .get_conversation_view(&user_id, &conversation_id)
        .await?;
    Ok(Json(ConversationResponse::with_messages(view)))
}

/// Active conversations of the caller, newest first
#[utoipa::path(
    get,
    path = "/conversations",
    params(ListConversationsQuery),
    responses(
        (status = 200, description = "Conversations", body = ConversationListResponse),
        (status = 400, description = "Unknown type", body = ErrorResponse)
    ),
    tag = "conversations"
)]
pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListConversationsQuery>,
) -> ApiResult<Json<ConversationListResponse>> {
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(str::parse::<ConversationKind>)
        .transpose()
        .map_err(ApiError::BadRequest)?;

    let views = state
        .orchestrator
        .list_conversations(&user_id, kind, query.include_messages)
        .await?;

    let conversations = views
        .into_iter()
        .map(|view| {
            let messages = query.include_messages.then_some(view.messages);
            ConversationResponse::new(view.conversation, messages)
        })
        .collect();
    Ok(Json(ConversationListResponse { conversations }))
}
