use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;
use utoipa::ToSchema;

use textly_persist::{DocumentPatch, NewDocument};

use crate::{
    auth::AuthUser,
    error::ApiResult,
    models::{DocumentResponse, ErrorResponse},
    state::AppState,
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateDocumentRequest {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub is_folder: bool,
}

/// Absent fields are left alone; `"parent": null` moves the document to the root
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<String>, nullable)]
    pub parent: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

#[utoipa::path(
    post,
    path = "/documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Document created", body = DocumentResponse),
        (status = 400, description = "Invalid name or parent", body = ErrorResponse),
        (status = 404, description = "Parent not found", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Json(req): Json<CreateDocumentRequest>,
) -> ApiResult<(StatusCode, Json<DocumentResponse>)> {
    let document = state
        .persist
        .documents()
        .create(
            &user_id,
            NewDocument {
                name: req.name,
                parent: req.parent,
                is_folder: req.is_folder,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(document.into())))
}

/// Rename or move a document
#[utoipa::path(
    patch,
    path = "/documents/{document_id}",
    params(("document_id" = String, Path, description = "Document id")),
    request_body = UpdateDocumentRequest,
    responses(
        (status = 200, description = "Document updated", body = DocumentResponse),
        (status = 400, description = "Move would create a cycle", body = ErrorResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(document_id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> ApiResult<Json<DocumentResponse>> {
    let document = state
        .persist
        .documents()
        .update(
            &user_id,
            &document_id,
            DocumentPatch {
                name: req.name,
                parent: req.parent,
            },
        )
        .await?;
    Ok(Json(document.into()))
}

#[utoipa::path(
    get,
    path = "/documents/{document_id}",
    params(("document_id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document", body = DocumentResponse),
        (status = 403, description = "Not the owner", body = ErrorResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    tag = "documents"
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    AuthUser(user_id): AuthUser,
    Path(document_id): Path<String>,
) -> ApiResult<Json<DocumentResponse>> {
    let document = state.persist.documents().get(&user_id, &document_id).await?;
    Ok(Json(document.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_absent_null_and_set_are_distinct() {
        let absent: UpdateDocumentRequest = serde_json::from_str(r#"{"name":"x"}"#).unwrap();
        assert_eq!(absent.parent, None);

        let cleared: UpdateDocumentRequest = serde_json::from_str(r#"{"parent":null}"#).unwrap();
        assert_eq!(cleared.parent, Some(None));

        let moved: UpdateDocumentRequest = serde_json::from_str(r#"{"parent":"f1"}"#).unwrap();
        assert_eq!(moved.parent, Some(Some("f1".to_string())));
    }
}
