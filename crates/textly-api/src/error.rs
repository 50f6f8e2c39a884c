use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use textly_chat::ChatError;
use textly_persist::PersistError;

use crate::models::ErrorResponse;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("Missing or empty {0} header")]
    Unauthorized(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Upstream(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::NotFound(msg) => Self::NotFound(msg),
            ChatError::Forbidden(_) => Self::Forbidden("Access denied".to_string()),
            ChatError::BadRequest(msg) => Self::BadRequest(msg),
            ChatError::CircularReference(kind) => {
                Self::BadRequest(format!("Circular reference detected: {}", kind))
            }
            ChatError::UpstreamStream(msg) => Self::Upstream(msg),
            ChatError::Persistence(e) => Self::Internal(e.to_string()),
        }
    }
}

impl From<PersistError> for ApiError {
    fn from(err: PersistError) -> Self {
        ChatError::from(err).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            Self::Internal(detail) => {
                tracing::error!(error = %detail, "Request failed");
                "Internal server error".to_string()
            }
            Self::Upstream(detail) => {
                tracing::warn!(error = %detail, "Provider call failed");
                self.to_string()
            }
            other => other.to_string(),
        };

        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use textly_persist::CycleKind;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::from(ChatError::NotFound("x".into())), StatusCode::NOT_FOUND),
            (ApiError::from(ChatError::Forbidden("x".into())), StatusCode::FORBIDDEN),
            (ApiError::from(ChatError::BadRequest("x".into())), StatusCode::BAD_REQUEST),
            (
                ApiError::from(ChatError::CircularReference(CycleKind::SelfReference)),
                StatusCode::BAD_REQUEST,
            ),
            (ApiError::Unauthorized("x-user-id".into()), StatusCode::UNAUTHORIZED),
            (ApiError::from(ChatError::UpstreamStream("x".into())), StatusCode::BAD_GATEWAY),
            (
                ApiError::from(PersistError::Database("down".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_document_errors_map_through_chat_taxonomy() {
        let err = ApiError::from(PersistError::DocumentNotFound("d1".into()));
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = ApiError::from(PersistError::InvalidInput("parent is not a folder".into()));
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
