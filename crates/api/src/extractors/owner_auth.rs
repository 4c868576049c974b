//! Owner authentication extractor.
//!
//! Survey owners sign in through an external identity provider; requests to
//! the authoring and analytics routes carry its access token as a Bearer
//! credential.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts};
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;

/// Authenticated survey owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OwnerAuth {
    /// User ID from the token's subject claim.
    pub user_id: Uuid,
}

/// Returns the token part of a `Bearer` authorization header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for OwnerAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing Authorization header".to_string()))?;

        let token = bearer_token(auth_header).ok_or_else(|| {
            ApiError::Unauthorized("Invalid Authorization header format".to_string())
        })?;

        let claims = state.jwt.validate_access_token(token)?;
        let user_id = shared::jwt::extract_user_id(&claims)?;

        Ok(OwnerAuth { user_id })
    }
}
