// Authentication extractor for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap},
};
use crate::auth::{
    cookie::{read_cookie, ACCESS_COOKIE},
    error::AuthError,
    token::{TokenKind, TokenService},
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Authenticated user extractor for protected routes
///
/// Accepts the access token from an `Authorization: Bearer` header or, for
/// browser clients, from the `token` cookie.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub username: String,
}

/// Extract the raw access token from request headers, `Authorization` first
pub fn access_token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidToken)?;
        let token = value.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header missing 'Bearer ' prefix");
            AuthError::InvalidToken
        })?;
        return Ok(Some(token));
    }

    Ok(read_cookie(headers, ACCESS_COOKIE))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = access_token_from_headers(&parts.headers)?.ok_or_else(|| {
            warn!("Missing access token for protected endpoint: {}", parts.uri.path());
            AuthError::MissingToken
        })?;

        let tokens = Arc::<TokenService>::from_ref(state);
        let claims = tokens.verify(token, TokenKind::Access)?;

        debug!(
            "Authenticated request: username={}, endpoint={}",
            claims.username,
            parts.uri.path()
        );
        Ok(AuthenticatedUser {
            username: claims.username,
        })
    }
}
