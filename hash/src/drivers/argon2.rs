use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Argon2;

use crate::errors::HashError;
use crate::hasher::Hasher;

/// Argon2id hashing driver.
///
/// Produces PHC string format hashes with a random salt per call.
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new driver instance with secure defaults.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for Argon2Hasher {
    fn make(&self, plain: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        argon2
            .hash_password(plain.as_bytes(), &salt)
            .map(|hashed| hashed.to_string())
            .map_err(|e| HashError::HashingFailed(e.to_string()))
    }

    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, HashError> {
        let parsed_hash = PasswordHash::new(hashed)
            .map_err(|e| HashError::VerificationFailed(format!("Invalid hash: {}", e)))?;

        let argon2 = Argon2::default();

        Ok(argon2
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
