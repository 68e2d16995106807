//! Error types for the Paillier library

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PaillierError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PaillierError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Invalid key size: {bits} bits (must be at least {min})")]
    InvalidKeySize { bits: u64, min: u64 },

    #[error("Plaintext must lie in [0, n)")]
    PlaintextOutOfRange,

    #[error("Ciphertext must lie in [0, n^2)")]
    CiphertextOutOfRange,

    #[error("Gave up on {what} after {attempts} attempts")]
    GenerationExhausted { what: String, attempts: usize },

    #[error("Invalid ciphertext: {0}")]
    InvalidCiphertext(String),

    #[error("Internal invariant violated: {0}")]
    InternalInvariantViolation(String),

    #[error("Random source unavailable: {0}")]
    RandomSourceUnavailable(String),

    #[error("Empty list provided for batch operation")]
    EmptyBatch,

    #[error("Mismatched lengths: {0}")]
    LengthMismatch(String),
}

impl From<rand::Error> for PaillierError {
    fn from(err: rand::Error) -> Self {
        PaillierError::RandomSourceUnavailable(err.to_string())
    }
}
