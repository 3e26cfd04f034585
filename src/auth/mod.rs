// Authentication module
// Cookie-based sessions: signup, login, access-token refresh and logout

pub mod cookie;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod reaper;
pub mod repository;
pub mod service;
pub mod token;

#[cfg(test)]
pub mod memory;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::{AuthResponse, LoginRequest, MessageResponse, RefreshResponse, SignupRequest};
pub use repository::{CredentialStore, PgCredentialStore, PgSessionStore, SessionStore};
pub use service::AuthService;
pub use token::TokenService;
