//! Core errors

use thiserror::Error;

/// Errors from hashing, encryption and randomness
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("Ciphertext too short: {len} bytes (minimum {min})")]
    InvalidCiphertext { len: usize, min: usize },

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Random source failure: {0}")]
    Random(String),

    #[error("Invalid hex: {0}")]
    InvalidHex(String),
}

/// Result type for core crypto operations
pub type CryptoResult<T> = Result<T, CryptoError>;
