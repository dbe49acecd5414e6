//! Compliance configuration
//!
//! Loaded from a JSON file; any missing field falls back to its default.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{ComplianceError, ComplianceResult};

/// Configuration for the Compliance Registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceConfig {
    // === Proofs ===
    /// Maximum age of a KYC proof accepted by verification (seconds)
    #[serde(default = "default_proof_max_age_secs")]
    pub proof_max_age_secs: u64,

    // === Attestations ===
    /// Validity used when a caller does not specify one (days)
    #[serde(default = "default_attestation_validity_days")]
    pub default_attestation_validity_days: u32,

    // === Connection ===
    /// Cluster label of the external connection handle
    #[serde(default = "default_cluster")]
    pub cluster: String,

    /// RPC endpoint of the external connection handle
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    // === Ledger ===
    /// Path of the JSONL compliance ledger (`None` = `compliance.jsonl` in the data dir)
    #[serde(default)]
    pub ledger_path: Option<PathBuf>,
}

/// Largest proof age a `chrono::Duration` can hold (its range is `i64` milliseconds)
pub const MAX_PROOF_MAX_AGE_SECS: u64 = (i64::MAX / 1000) as u64;

fn default_proof_max_age_secs() -> u64 {
    3600 // 1 hour
}

fn default_attestation_validity_days() -> u32 {
    30
}

fn default_cluster() -> String {
    "devnet".to_string()
}

fn default_rpc_url() -> String {
    "https://api.devnet.solana.com".to_string()
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            proof_max_age_secs: default_proof_max_age_secs(),
            default_attestation_validity_days: default_attestation_validity_days(),
            cluster: default_cluster(),
            rpc_url: default_rpc_url(),
            ledger_path: None,
        }
    }
}

impl ComplianceConfig {
    /// Load configuration from JSON file
    pub fn from_file(path: &Path) -> ComplianceResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make every proof unverifiable
    pub fn validate(&self) -> ComplianceResult<()> {
        if self.proof_max_age_secs == 0 {
            return Err(ComplianceError::Config(
                "proof_max_age_secs must be greater than 0".to_string(),
            ));
        }
        if self.proof_max_age_secs > MAX_PROOF_MAX_AGE_SECS {
            return Err(ComplianceError::Config(format!(
                "proof_max_age_secs must be at most {}",
                MAX_PROOF_MAX_AGE_SECS
            )));
        }
        if self.rpc_url.trim().is_empty() {
            return Err(ComplianceError::Config("rpc_url cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Get proof max age as Duration
    pub fn proof_max_age(&self) -> Duration {
        Duration::from_secs(self.proof_max_age_secs)
    }

    /// Get proof max age as chrono Duration
    ///
    /// Fails for values `validate` would reject, since a context can be
    /// built from an unvalidated config.
    pub fn proof_max_age_chrono(&self) -> ComplianceResult<chrono::Duration> {
        i64::try_from(self.proof_max_age_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| {
                ComplianceError::Config(format!(
                    "proof_max_age_secs out of range: {}",
                    self.proof_max_age_secs
                ))
            })
    }
}
