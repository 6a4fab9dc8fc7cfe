use crate::errors::HashError;

/// Opaque hashing capability.
///
/// Implemented by concrete drivers; consumers only depend on this trait so
/// the underlying algorithm stays swappable.
pub trait Hasher: Send + Sync {
    /// Hash a plaintext secret for storage.
    ///
    /// # Arguments
    /// * `plain` - Plaintext secret to hash
    ///
    /// # Returns
    /// Hash string in a self-describing format
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    fn make(&self, plain: &str) -> Result<String, HashError>;

    /// Verify a plaintext secret against a stored hash.
    ///
    /// # Arguments
    /// * `plain` - Plaintext secret to verify
    /// * `hashed` - Stored hash string
    ///
    /// # Returns
    /// True if the secret matches, false otherwise
    ///
    /// # Errors
    /// * `VerificationFailed` - Hash format is invalid or verification failed
    fn verify(&self, plain: &str, hashed: &str) -> Result<bool, HashError>;
}
