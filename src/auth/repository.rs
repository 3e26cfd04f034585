// Credential and session stores

use crate::auth::{
    error::AuthError,
    models::{CredentialRecord, SessionRecord},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Hash a refresh token using SHA-256
///
/// Session lookups compare digests, so the raw token never reaches storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Store of username -> password hash records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a credential record by exact username
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError>;

    /// Insert a new credential record
    ///
    /// Must be an atomic unique insert: a concurrent insert of the same
    /// username fails with `AuthError::AlreadyExists`.
    async fn insert(&self, username: &str, password_hash: &str) -> Result<CredentialRecord, AuthError>;
}

/// Store of refresh-token sessions, used as an allow-list
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a session for a freshly issued refresh token
    async fn insert(
        &self,
        username: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError>;

    /// Find the session holding exactly this refresh token
    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<SessionRecord>, AuthError>;

    /// Delete every session owned by `username`, returning how many were removed
    async fn revoke_user(&self, username: &str) -> Result<u64, AuthError>;

    /// Delete sessions whose refresh token expired before `now`
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError>;
}

/// PostgreSQL credential store over the `users` table
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError> {
        let user = sqlx::query_as::<_, CredentialRecord>(
            "SELECT username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(user)
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<CredentialRecord, AuthError> {
        let user = sqlx::query_as::<_, CredentialRecord>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING username, password_hash, created_at",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // The primary key on username closes the check-then-insert race
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return AuthError::AlreadyExists;
                }
            }
            AuthError::DatabaseError(e.to_string())
        })?;

        Ok(user)
    }
}

/// PostgreSQL session store over the `sessions` table
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(
        &self,
        username: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        sqlx::query("INSERT INTO sessions (username, token_hash, expires_at) VALUES ($1, $2, $3)")
            .bind(username)
            .bind(hash_token(refresh_token))
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<SessionRecord>, AuthError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, username, token_hash, expires_at, created_at
             FROM sessions
             WHERE token_hash = $1
             LIMIT 1",
        )
        .bind(hash_token(refresh_token))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(session)
    }

    async fn revoke_user(&self, username: &str) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE username = $1")
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AuthError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}
