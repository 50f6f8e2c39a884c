use axum::Json;
use utoipa::OpenApi;

use crate::models::{
    ConversationListResponse, ConversationResponse, DocumentResponse, ErrorResponse,
    MessageResponse, ModelCapabilities, ModelEntry, ModelsResponse, SuccessResponse,
    SuggestionResponse,
};
use crate::routes::{ai, conversations, documents, health};

#[derive(OpenApi)]
#[openapi(
    info(title = "Textly API", description = "AI writing assistant backend"),
    paths(
        health::health_check,
        conversations::start_conversation,
        conversations::continue_conversation,
        conversations::edit_conversation,
        conversations::deactivate_conversation,
        conversations::get_conversation,
        conversations::list_conversations,
        ai::chat,
        ai::assist,
        ai::models,
        documents::create_document,
        documents::update_document,
        documents::get_document,
    ),
    components(schemas(
        health::HealthResponse,
        conversations::StartConversationRequest,
        conversations::ContinueConversationRequest,
        conversations::EditConversationRequest,
        conversations::DeactivateConversationRequest,
        ai::ChatMessage,
        ai::ChatRequest,
        ai::AssistQuery,
        documents::CreateDocumentRequest,
        documents::UpdateDocumentRequest,
        ConversationResponse,
        ConversationListResponse,
        MessageResponse,
        DocumentResponse,
        ModelEntry,
        ModelCapabilities,
        ModelsResponse,
        SuccessResponse,
        SuggestionResponse,
        ErrorResponse,
    )),
    tags(
        (name = "health"),
        (name = "conversations", description = "Streamed chat turns and their history"),
        (name = "ai", description = "Stateless chat, text tools and the model catalog"),
        (name = "documents", description = "Document tree")
    )
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
