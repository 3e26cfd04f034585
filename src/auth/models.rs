// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Credential record (username -> salted password hash)
#[derive(Debug, Clone, FromRow)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Session record binding a refresh token to its owner
///
/// Only the SHA-256 digest of the refresh token is kept.
#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: i64,
    pub username: String,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Signup request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignupRequest {
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    #[schema(example = "newuser")]
    pub username: String,
    #[validate(length(min = 1, max = 256, message = "Password must be between 1 and 256 characters"))]
    #[schema(example = "securepassword")]
    pub password: String,
}

/// Login request DTO
///
/// Not length-validated: any username/password that does not match a stored
/// credential is answered with the same `InvalidCredentials`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "admin")]
    pub username: String,
    #[schema(example = "password")]
    pub password: String,
}

/// Body returned by signup and login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    #[schema(example = "Authenticated")]
    pub message: String,
    /// Access token, also set as the `token` cookie
    pub jwt: String,
}

/// Body returned by refresh
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    /// New access token, also set as the `token` cookie
    pub token: String,
}

/// Body returned by logout
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    #[schema(example = "Logged out")]
    pub message: String,
}

/// Token pair produced by a successful signup or login
#[derive(Debug, Clone)]
pub struct IssuedTokens {
    pub access_token: String,
    pub refresh_token: String,
}
