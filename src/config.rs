// Runtime configuration loaded from the environment

use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Secrets shorter than this are accepted but flagged at startup
const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} is not a valid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide configuration, read once at startup
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    /// Signing secret for access tokens (`JWT_SECRET`)
    pub jwt_secret: String,
    /// Signing secret for refresh tokens (`REFRESH_SECRET`)
    pub refresh_secret: String,
    pub session_reap_interval: Duration,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_reap_interval", &self.session_reap_interval)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// `DATABASE_URL`, `JWT_SECRET` and `REFRESH_SECRET` are mandatory. There
    /// is no fallback secret.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;
        let refresh_secret = required("REFRESH_SECRET")?;

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match lookup("PORT") {
            Some(value) => value
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { name: "PORT", value })?,
            None => 8080,
        };
        let reap_secs = match lookup("SESSION_REAP_INTERVAL_SECS") {
            Some(value) => match value.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "SESSION_REAP_INTERVAL_SECS",
                        value,
                    })
                }
            },
            None => 3600,
        };

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            refresh_secret,
            session_reap_interval: Duration::from_secs(reap_secs),
        })
    }

    /// Log weak signing configuration
    pub fn warn_on_weak_secrets(&self) {
        if self.jwt_secret == self.refresh_secret {
            warn!("JWT_SECRET and REFRESH_SECRET are identical; use distinct secrets");
        }
        if self.jwt_secret.len() < MIN_SECRET_LEN {
            warn!("JWT_SECRET is shorter than {} bytes", MIN_SECRET_LEN);
        }
        if self.refresh_secret.len() < MIN_SECRET_LEN {
            warn!("REFRESH_SECRET is shorter than {} bytes", MIN_SECRET_LEN);
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
