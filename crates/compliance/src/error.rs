//! Compliance errors

use thiserror::Error;
use veil_core::CryptoError;

use crate::store::StoreError;

/// Errors from the Compliance Registry
#[derive(Debug, Error)]
pub enum ComplianceError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Audit key invalid or expired: {0}")]
    InvalidOrExpired(String),

    #[error("No claims match the requested types")]
    NoMatchingClaims,

    #[error("All matching claims have expired")]
    AllClaimsExpired,

    #[error("Malformed proof: {0}")]
    MalformedProof(&'static str),

    #[error("Proof expired: generated {age_ms}ms ago (max {max_ms}ms)")]
    ProofExpired { age_ms: i64, max_ms: i64 },

    #[error("Attestation revoked: {0}")]
    Revoked(String),

    #[error("Attestation outside validity window: {0}")]
    OutOfValidityWindow(String),

    #[error("Disclosure request expired")]
    RequestExpired,

    #[error("Validity period out of range: {0}")]
    InvalidValidity(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ComplianceError {
    pub(crate) fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        ComplianceError::NotFound {
            kind,
            id: id.into(),
        }
    }
}

/// Result type for compliance operations
pub type ComplianceResult<T> = Result<T, ComplianceError>;
