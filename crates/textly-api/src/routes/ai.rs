use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::ToSchema;

use textly_chat::AssistRequest;
use textly_llm::Message;

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    handlers::stream::sse_response,
    models::{ErrorResponse, ModelsResponse, SuggestionResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatMessage {
    /// system, user or assistant
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AssistQuery {
    /// improvement, synonyms or description
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
    #[serde(default)]
    pub context: Option<String>,
}

impl TryFrom<ChatMessage> for Message {
    type Error = ApiError;

    fn try_from(message: ChatMessage) -> Result<Self, Self::Error> {
        match message.role.as_str() {
            "system" => Ok(Message::system(message.content)),
            "user" => Ok(Message::human(message.content)),
            "assistant" => Ok(Message::ai(message.content)),
            other => Err(ApiError::BadRequest(format!("unknown message role: {}", other))),
        }
    }
}

/// Stream an answer over a caller-supplied history; nothing is stored
#[utoipa::path(
    post,
    path = "/ai/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Content events", content_type = "text/event-stream"),
        (status = 400, description = "Invalid history", body = ErrorResponse)
    ),
    tag = "ai"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    AuthUser(_user_id): AuthUser,
    Json(req): Json<ChatRequest>,
) -> ApiResult<impl IntoResponse> {
    let messages = req
        .messages
        .into_iter()
        .map(Message::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    let events = state.orchestrator.stateless_chat(messages)?;
    Ok(sse_response(events))
}

/// Improve a passage, list synonyms or describe a text
#[utoipa::path(
    post,
    path = "/ai/assist",
    request_body = AssistQuery,
    responses(
        (status = 200, description = "Suggestion", body = SuggestionResponse),
        (status = 400, description = "Unknown type", body = ErrorResponse),
        (status = 502, description = "Provider failed", body = ErrorResponse)
    ),
    tag = "ai"
)]
pub async fn assist(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<AssistQuery>,
) -> ApiResult<Json<SuggestionResponse>> {
    let suggestion = state
        .orchestrator
        .text_assist(
            &user_id,
            AssistRequest {
                kind: req.kind,
                text: req.text,
                context: req.context,
            },
        )
        .await?;
    Ok(Json(SuggestionResponse { suggestion }))
}

#[utoipa::path(
    get,
    path = "/ai/models",
    responses((status = 200, description = "Model catalog", body = ModelsResponse)),
    tag = "ai"
)]
pub async fn models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: state.config.models.clone(),
    })
}
