// Authentication service - business logic layer

use crate::auth::{
    error::AuthError,
    models::IssuedTokens,
    password::PasswordService,
    repository::{CredentialStore, SessionStore},
    token::{TokenKind, TokenService},
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Authentication service coordinating all auth operations
pub struct AuthService {
    credentials: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    /// Create a new AuthService
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            tokens,
        }
    }

    /// Register a new user
    ///
    /// This method:
    /// 1. Rejects usernames that are already registered
    /// 2. Hashes the password and stores the credential record
    /// 3. Issues a token pair and opens a session for the refresh token
    ///
    /// A failure in step 3 leaves the user registered without a session.
    pub async fn signup(&self, username: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        // 1. Check for an existing account
        if self.credentials.find_by_username(username).await?.is_some() {
            debug!("Signup rejected, username taken: {}", username);
            return Err(AuthError::AlreadyExists);
        }

        // 2. Hash off the async executor, then insert (unique insert)
        let password = password.to_string();
        let password_hash = tokio::task::spawn_blocking(move || PasswordService::hash_password(&password))
            .await
            .map_err(|_| AuthError::PasswordHashError)??;
        self.credentials.insert(username, &password_hash).await?;

        // 3. Open a session
        let tokens = self.open_session(username).await?;

        info!("User registered: {}", username);
        Ok(tokens)
    }

    /// Login a user
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`.
    /// Earlier sessions of the same user stay valid.
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedTokens, AuthError> {
        let credential = self
            .credentials
            .find_by_username(username)
            .await?
            .ok_or_else(|| {
                debug!("Login failed, unknown username: {}", username);
                AuthError::InvalidCredentials
            })?;

        let password = password.to_string();
        let password_hash = credential.password_hash;
        let matches = tokio::task::spawn_blocking(move || {
            PasswordService::verify_password(&password, &password_hash)
        })
        .await
        .map_err(|_| AuthError::PasswordHashError)?;

        if !matches {
            debug!("Login failed, wrong password for: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = self.open_session(username).await?;

        info!("User logged in: {}", username);
        Ok(tokens)
    }

    /// Exchange a refresh token for a new access token
    ///
    /// The refresh token must both be present in the session store and verify
    /// against the refresh secret. It is not rotated.
    pub async fn refresh(&self, refresh_token: Option<&str>) -> Result<String, AuthError> {
        let refresh_token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let session = self
            .sessions
            .find_by_token(refresh_token)
            .await?
            .ok_or_else(|| {
                debug!("Refresh token has no session (never issued or revoked)");
                AuthError::Forbidden
            })?;

        let claims = self
            .tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|_| AuthError::Forbidden)?;

        if claims.username != session.username {
            warn!(
                "Refresh token subject {} does not match session owner {}",
                claims.username, session.username
            );
            return Err(AuthError::Forbidden);
        }

        let access_token = self.tokens.issue_access(&claims.username)?;
        debug!("Issued refreshed access token for: {}", claims.username);
        Ok(access_token)
    }

    /// Resolve who is calling logout
    ///
    /// The owner of the session holding the refresh token wins; otherwise a
    /// valid access token identifies the caller.
    pub async fn identify_caller(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> Result<Option<String>, AuthError> {
        if let Some(token) = refresh_token.filter(|token| !token.is_empty()) {
            if let Some(session) = self.sessions.find_by_token(token).await? {
                return Ok(Some(session.username));
            }
        }

        Ok(access_token
            .and_then(|token| self.tokens.verify(token, TokenKind::Access).ok())
            .map(|claims| claims.username))
    }

    /// Revoke every session of the caller
    ///
    /// Anonymous callers revoke nothing; the call still succeeds.
    pub async fn logout(&self, caller: Option<&str>) -> Result<u64, AuthError> {
        let Some(username) = caller else {
            debug!("Logout without a resolvable identity, nothing revoked");
            return Ok(0);
        };

        let revoked = self.sessions.revoke_user(username).await?;
        info!("User logged out: {} ({} sessions revoked)", username, revoked);
        Ok(revoked)
    }

    async fn open_session(&self, username: &str) -> Result<IssuedTokens, AuthError> {
        let (access_token, refresh_token) = self.tokens.issue_pair(username)?;
        self.sessions
            .insert(username, &refresh_token, self.tokens.refresh_expiry())
            .await?;

        Ok(IssuedTokens {
            access_token,
            refresh_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::memory::{FailingSessionStore, MemoryCredentialStore, MemorySessionStore};
    use chrono::{Duration, Utc};

    struct Fixture {
        service: AuthService,
        credentials: Arc<MemoryCredentialStore>,
        sessions: Arc<MemorySessionStore>,
        tokens: Arc<TokenService>,
    }

    fn fixture() -> Fixture {
        let credentials = Arc::new(MemoryCredentialStore::default());
        let sessions = Arc::new(MemorySessionStore::default());
        let tokens = Arc::new(TokenService::new("access-secret", "refresh-secret"));
        let service = AuthService::new(credentials.clone(), sessions.clone(), tokens.clone());
        Fixture {
            service,
            credentials,
            sessions,
            tokens,
        }
    }

    #[tokio::test]
    async fn test_signup_then_login_succeeds() {
        let f = fixture();
        let issued = f.service.signup("alice", "pw1").await.unwrap();
        assert!(f.tokens.verify(&issued.access_token, TokenKind::Access).is_ok());
        assert!(f.tokens.verify(&issued.refresh_token, TokenKind::Refresh).is_ok());

        let issued = f.service.login("alice", "pw1").await.unwrap();
        let claims = f.tokens.verify(&issued.access_token, TokenKind::Access).unwrap();
        assert_eq!(claims.username, "alice");
    }

    #[tokio::test]
    async fn test_signup_twice_is_rejected_without_second_record() {
        let f = fixture();
        f.service.signup("alice", "pw1").await.unwrap();

        let result = f.service.signup("alice", "other").await;
        assert!(matches!(result, Err(AuthError::AlreadyExists)));
        assert_eq!(f.credentials.len(), 1);
        assert_eq!(f.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let f = fixture();
        f.service.signup("alice", "pw1").await.unwrap();

        let wrong_password = f.service.login("alice", "wrong").await.unwrap_err();
        let unknown_user = f.service.login("bob", "pw1").await.unwrap_err();

        assert!(matches!(wrong_password, AuthError::InvalidCredentials));
        assert!(matches!(unknown_user, AuthError::InvalidCredentials));
        assert_eq!(wrong_password.error_message(), unknown_user.error_message());
        assert_eq!(wrong_password.status_code(), unknown_user.status_code());
    }

    #[tokio::test]
    async fn test_login_accumulates_sessions() {
        let f = fixture();
        let first = f.service.signup("alice", "pw1").await.unwrap();
        let second = f.service.login("alice", "pw1").await.unwrap();

        assert_eq!(f.sessions.count_for("alice"), 2);
        assert!(f.service.refresh(Some(&first.refresh_token)).await.is_ok());
        assert!(f.service.refresh(Some(&second.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_refresh_without_token_is_unauthenticated() {
        let f = fixture();
        assert!(matches!(f.service.refresh(None).await, Err(AuthError::Unauthenticated)));
        assert!(matches!(f.service.refresh(Some("")).await, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn test_refresh_with_unknown_token_is_forbidden() {
        let f = fixture();
        // Cryptographically valid but never persisted
        let orphan = f.tokens.issue_refresh("alice").unwrap();
        assert!(matches!(f.service.refresh(Some(&orphan)).await, Err(AuthError::Forbidden)));
    }

    #[tokio::test]
    async fn test_refresh_with_persisted_but_invalid_token_is_forbidden() {
        let f = fixture();
        // Persisted but signed with the access secret
        let foreign = f.tokens.issue_access("alice").unwrap();
        f.sessions
            .insert("alice", &foreign, Utc::now() + Duration::days(7))
            .await
            .unwrap();

        assert!(matches!(f.service.refresh(Some(&foreign)).await, Err(AuthError::Forbidden)));
    }

    #[tokio::test]
    async fn test_refresh_does_not_rotate_and_can_be_replayed() {
        let f = fixture();
        let issued = f.service.signup("alice", "pw1").await.unwrap();

        let first = f.service.refresh(Some(&issued.refresh_token)).await.unwrap();
        let second = f.service.refresh(Some(&issued.refresh_token)).await.unwrap();

        assert!(f.tokens.verify(&first, TokenKind::Access).is_ok());
        assert!(f.tokens.verify(&second, TokenKind::Access).is_ok());
        assert_eq!(f.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_logout_revokes_only_the_callers_sessions() {
        let f = fixture();
        let alice = f.service.signup("alice", "pw1").await.unwrap();
        let bob = f.service.signup("bob", "pw2").await.unwrap();

        let caller = f
            .service
            .identify_caller(None, Some(&alice.refresh_token))
            .await
            .unwrap();
        assert_eq!(caller.as_deref(), Some("alice"));

        let revoked = f.service.logout(caller.as_deref()).await.unwrap();
        assert_eq!(revoked, 1);

        assert!(matches!(
            f.service.refresh(Some(&alice.refresh_token)).await,
            Err(AuthError::Forbidden)
        ));
        assert!(f.service.refresh(Some(&bob.refresh_token)).await.is_ok());
    }

    #[tokio::test]
    async fn test_identify_caller_falls_back_to_access_token() {
        let f = fixture();
        let alice = f.service.signup("alice", "pw1").await.unwrap();

        let caller = f
            .service
            .identify_caller(Some(&alice.access_token), Some("unknown-refresh-token"))
            .await
            .unwrap();
        assert_eq!(caller.as_deref(), Some("alice"));

        let nobody = f.service.identify_caller(Some("garbage"), None).await.unwrap();
        assert!(nobody.is_none());
    }

    #[tokio::test]
    async fn test_anonymous_logout_succeeds_and_revokes_nothing() {
        let f = fixture();
        f.service.signup("alice", "pw1").await.unwrap();

        assert_eq!(f.service.logout(None).await.unwrap(), 0);
        assert_eq!(f.sessions.len(), 1);
    }

    #[tokio::test]
    async fn test_session_store_failure_leaves_user_registered() {
        let credentials = Arc::new(MemoryCredentialStore::default());
        let tokens = Arc::new(TokenService::new("access-secret", "refresh-secret"));
        let service = AuthService::new(credentials.clone(), Arc::new(FailingSessionStore), tokens);

        let result = service.signup("alice", "pw1").await;
        assert!(matches!(result, Err(AuthError::DatabaseError(_))));
        assert_eq!(credentials.len(), 1);
    }
}
