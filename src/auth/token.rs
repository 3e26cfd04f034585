// JWT token generation and validation service

use crate::auth::error::AuthError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

/// Access tokens expire in 15 minutes
pub const ACCESS_TOKEN_TTL_SECS: i64 = 900;
/// Refresh tokens expire in 7 days
pub const REFRESH_TOKEN_TTL_SECS: i64 = 604_800;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Unique token id, keeps tokens issued in the same second distinct
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

/// Which signing context a token belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

struct SigningContext {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl SigningContext {
    fn new(secret: &str, ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }
}

/// Token service for JWT operations
///
/// Access and refresh tokens are signed with independent secrets, so a token
/// of one kind never verifies as the other.
pub struct TokenService {
    access: SigningContext,
    refresh: SigningContext,
}

impl TokenService {
    /// Create a new TokenService from the two signing secrets
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access: SigningContext::new(access_secret, ACCESS_TOKEN_TTL_SECS),
            refresh: SigningContext::new(refresh_secret, REFRESH_TOKEN_TTL_SECS),
        }
    }

    fn context(&self, kind: TokenKind) -> &SigningContext {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }

    fn issue(&self, kind: TokenKind, username: &str) -> Result<String, AuthError> {
        let context = self.context(kind);
        let now = Utc::now().timestamp();

        let claims = Claims {
            username: username.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + context.ttl_secs,
        };

        encode(&Header::default(), &claims, &context.encoding_key)
            .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Generate an access token (15 minutes)
    pub fn issue_access(&self, username: &str) -> Result<String, AuthError> {
        self.issue(TokenKind::Access, username)
    }

    /// Generate a refresh token (7 days)
    pub fn issue_refresh(&self, username: &str) -> Result<String, AuthError> {
        self.issue(TokenKind::Refresh, username)
    }

    /// Generate both access and refresh tokens
    pub fn issue_pair(&self, username: &str) -> Result<(String, String), AuthError> {
        let access_token = self.issue_access(username)?;
        let refresh_token = self.issue_refresh(username)?;
        Ok((access_token, refresh_token))
    }

    /// Verify a token against the secret of the given kind
    ///
    /// Expired, malformed and foreign tokens all yield `InvalidToken`; the
    /// reason is only logged.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.context(kind).decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => debug!("Rejected expired {} token", kind),
                    ErrorKind::InvalidSignature => {
                        debug!("Rejected {} token with invalid signature", kind)
                    }
                    other => debug!("Rejected malformed {} token: {:?}", kind, other),
                }
                AuthError::InvalidToken
            })
    }

    /// Expiry instant of a refresh token issued now
    pub fn refresh_expiry(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.refresh.ttl_secs)
    }
}
