// In-memory stores backing the auth tests

use crate::auth::{
    error::AuthError,
    models::{CredentialRecord, SessionRecord},
    repository::{hash_token, CredentialStore, SessionStore},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Mutex<HashMap<String, CredentialRecord>>,
}

impl MemoryCredentialStore {
    pub fn len(&self) -> usize {
        self.users.lock().len()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<CredentialRecord>, AuthError> {
        Ok(self.users.lock().get(username).cloned())
    }

    async fn insert(&self, username: &str, password_hash: &str) -> Result<CredentialRecord, AuthError> {
        let mut users = self.users.lock();
        if users.contains_key(username) {
            return Err(AuthError::AlreadyExists);
        }
        let record = CredentialRecord {
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        users.insert(username.to_string(), record.clone());
        Ok(record)
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: Mutex<Vec<SessionRecord>>,
}

impl MemorySessionStore {
    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn count_for(&self, username: &str) -> usize {
        self.sessions
            .lock()
            .iter()
            .filter(|s| s.username == username)
            .count()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(
        &self,
        username: &str,
        refresh_token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut sessions = self.sessions.lock();
        let id = sessions.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        sessions.push(SessionRecord {
            id,
            username: username.to_string(),
            token_hash: hash_token(refresh_token),
            expires_at,
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_by_token(&self, refresh_token: &str) -> Result<Option<SessionRecord>, AuthError> {
        let token_hash = hash_token(refresh_token);
        Ok(self
            .sessions
            .lock()
            .iter()
            .find(|s| s.token_hash == token_hash)
            .cloned())
    }

    async fn revoke_user(&self, username: &str) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|s| s.username != username);
        Ok((before - sessions.len()) as u64)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, AuthError> {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|s| s.expires_at >= now);
        Ok((before - sessions.len()) as u64)
    }
}

/// Session store whose every call fails, for error-path tests
pub struct FailingSessionStore;

#[async_trait]
impl SessionStore for FailingSessionStore {
    async fn insert(&self, _: &str, _: &str, _: DateTime<Utc>) -> Result<(), AuthError> {
        Err(AuthError::DatabaseError("connection refused".to_string()))
    }

    async fn find_by_token(&self, _: &str) -> Result<Option<SessionRecord>, AuthError> {
        Err(AuthError::DatabaseError("connection refused".to_string()))
    }

    async fn revoke_user(&self, _: &str) -> Result<u64, AuthError> {
        Err(AuthError::DatabaseError("connection refused".to_string()))
    }

    async fn delete_expired(&self, _: DateTime<Utc>) -> Result<u64, AuthError> {
        Err(AuthError::DatabaseError("connection refused".to_string()))
    }
}
