use thiserror::Error;

/// Error type for hashing operations.
#[derive(Debug, Clone, Error)]
pub enum HashError {
    #[error("Hashing failed: {0}")]
    HashingFailed(String),

    #[error("Verification failed: {0}")]
    VerificationFailed(String),
}
