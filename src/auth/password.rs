// Password hashing and verification service

use crate::auth::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use tracing::debug;

/// Argon2 memory cost in KiB
const MEMORY_COST_KIB: u32 = 19_456;
/// Argon2 iterations
const TIME_COST: u32 = 2;
/// Argon2 lanes
const PARALLELISM: u32 = 1;

/// Password service for hashing and verification
pub struct PasswordService;

impl PasswordService {
    fn hasher() -> Result<Argon2<'static>, AuthError> {
        let params = Params::new(MEMORY_COST_KIB, TIME_COST, PARALLELISM, None)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    /// Hash a password using Argon2id with a random salt
    ///
    /// Returns a PHC string that embeds the salt and the cost parameters.
    pub fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Self::hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| AuthError::PasswordHashError)?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// A malformed hash counts as a mismatch.
    pub fn verify_password(password: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        // Parameters come from the PHC string, so older hashes keep verifying
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
