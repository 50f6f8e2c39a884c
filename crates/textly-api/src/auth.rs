use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use std::sync::Arc;

use crate::{error::ApiError, state::AppState};

/// Id of the caller, as forwarded by the authenticating gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.user_header.as_str();
        let user_id = parts
            .headers
            .get(header)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized(header.to_string()))?;

        Ok(Self(user_id.to_string()))
    }
}
