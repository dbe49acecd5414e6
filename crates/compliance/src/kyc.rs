//! KYC Claim Store & Proof Generator
//!
//! **The proofs built here are not zero-knowledge.** A [`ZkKycProof`] is a
//! set of SHA-256 digests over the plaintext claims:
//!
//! - `commitment = sha256("type:value|type:value|...")`
//! - `nullifier  = sha256("nullifier:" + same + ":" + timestamp_ms)`
//! - `proof      = sha256(json{claims, requirements, timestamp})`
//!
//! `proof` hashes the claim values themselves, so anyone able to guess the
//! serialization can confirm them. The nullifier embeds the generation
//! time and therefore differs on every call; it does not prevent replay.
//! Verification only checks freshness and that the fields are populated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};
use veil_core::{random_id, sha256_hex};

use crate::context::ComplianceContext;
use crate::error::{ComplianceError, ComplianceResult};
use crate::store::{MemoryStore, Store};

/// Issuer label hashed for claims without an issuer
pub const SELF_ISSUER: &str = "self";

/// Kinds of KYC claim
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
    IntoStaticStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    #[strum(serialize = "age_over_18")]
    #[serde(rename = "age_over_18")]
    AgeOver18,
    #[strum(serialize = "age_over_21")]
    #[serde(rename = "age_over_21")]
    AgeOver21,
    AccreditedInvestor,
    CountryOfResidence,
    SanctionsCleared,
    KycVerified,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// Claim payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ClaimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimValue::Bool(b) => write!(f, "{}", b),
            ClaimValue::Number(n) => write!(f, "{}", n),
            ClaimValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<bool> for ClaimValue {
    fn from(value: bool) -> Self {
        ClaimValue::Bool(value)
    }
}

impl From<i64> for ClaimValue {
    fn from(value: i64) -> Self {
        ClaimValue::Number(value.into())
    }
}

impl From<&str> for ClaimValue {
    fn from(value: &str) -> Self {
        ClaimValue::Text(value.to_string())
    }
}

impl From<String> for ClaimValue {
    fn from(value: String) -> Self {
        ClaimValue::Text(value)
    }
}

/// A stored KYC claim. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KycClaim {
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub value: ClaimValue,
    pub issuer: Option<String>,
    pub issued_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl KycClaim {
    pub fn new(claim_type: ClaimType, value: impl Into<ClaimValue>, issued_at: DateTime<Utc>) -> Self {
        Self {
            claim_type,
            value: value.into(),
            issuer: None,
            issued_at,
            expires_at: None,
        }
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Expired once `expires_at <= now`; claims without expiry never expire
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|t| t <= now)
    }

    fn serialize_pair(&self) -> String {
        format!("{}:{}", self.claim_type, self.value)
    }
}

/// Public part of a KYC proof
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofPublicInputs {
    pub claim_types: Vec<ClaimType>,
    pub issuer_commitments: Vec<String>,
    pub expiration_valid: bool,
}

/// Hash-based KYC "proof" (see module docs: not zero-knowledge)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZkKycProof {
    pub proof: String,
    pub public_inputs: ProofPublicInputs,
    pub commitment: String,
    pub nullifier: String,
    pub timestamp: DateTime<Utc>,
}

/// JSON hashed into `ZkKycProof::proof`. Contains the plaintext claims.
#[derive(Serialize)]
struct ProofPreimage<'a> {
    claims: &'a [KycClaim],
    requirements: &'a serde_json::Value,
    timestamp: i64,
}

/// KYC claim store and proof generator
pub struct KycRegistry {
    ctx: ComplianceContext,
    store: Box<dyn Store<KycClaim>>,
}

impl KycRegistry {
    pub fn new(ctx: ComplianceContext, store: Box<dyn Store<KycClaim>>) -> Self {
        Self { ctx, store }
    }

    pub fn in_memory(ctx: ComplianceContext) -> Self {
        Self::new(ctx, Box::new(MemoryStore::<KycClaim>::new()))
    }

    /// Store a claim under a fresh id. No dedup, no value validation.
    pub fn store_kyc_claim(&mut self, claim: KycClaim) -> ComplianceResult<String> {
        let claim_id = random_id::<16>()?;
        let claim_type = claim.claim_type;
        self.store.put(&claim_id, claim)?;

        tracing::info!(claim_id = %claim_id, claim_type = %claim_type, "KYC claim stored");
        Ok(claim_id)
    }

    pub fn get_kyc_claim(&self, claim_id: &str) -> ComplianceResult<KycClaim> {
        self.store
            .get(claim_id)?
            .ok_or_else(|| ComplianceError::not_found("KYC claim", claim_id))
    }

    /// All claims with their ids, in storage order
    pub fn list_kyc_claims(&self) -> ComplianceResult<Vec<(String, KycClaim)>> {
        Ok(self.store.list()?)
    }

    /// Build a proof over the stored, unexpired claims of `claim_types`
    pub fn generate_kyc_proof(
        &self,
        claim_types: &[ClaimType],
        requirements: &serde_json::Value,
    ) -> ComplianceResult<ZkKycProof> {
        let matching: Vec<KycClaim> = self
            .store
            .list()?
            .into_iter()
            .map(|(_, claim)| claim)
            .filter(|claim| claim_types.contains(&claim.claim_type))
            .collect();

        if matching.is_empty() {
            tracing::debug!(requested = claim_types.len(), "No matching KYC claims");
            return Err(ComplianceError::NoMatchingClaims);
        }

        let now = self.ctx.now();
        let valid: Vec<KycClaim> = matching
            .into_iter()
            .filter(|claim| !claim.is_expired(now))
            .collect();

        if valid.is_empty() {
            tracing::debug!("All matching KYC claims expired");
            return Err(ComplianceError::AllClaimsExpired);
        }

        let timestamp_ms = now.timestamp_millis();
        let serialized = valid
            .iter()
            .map(KycClaim::serialize_pair)
            .collect::<Vec<_>>()
            .join("|");

        let commitment = sha256_hex(&serialized);
        let nullifier = sha256_hex(format!("nullifier:{}:{}", serialized, timestamp_ms));

        let preimage = ProofPreimage {
            claims: &valid,
            requirements,
            timestamp: timestamp_ms,
        };
        let proof = sha256_hex(serde_json::to_string(&preimage)?);

        let public_inputs = ProofPublicInputs {
            claim_types: valid.iter().map(|c| c.claim_type).collect(),
            issuer_commitments: valid
                .iter()
                .map(|c| sha256_hex(c.issuer.as_deref().unwrap_or(SELF_ISSUER)))
                .collect(),
            expiration_valid: true,
        };

        tracing::debug!(claims = valid.len(), commitment = %commitment, "KYC proof generated");

        Ok(ZkKycProof {
            proof,
            public_inputs,
            commitment,
            nullifier,
            timestamp: now,
        })
    }

    /// Structural verification: freshness plus non-empty fields
    ///
    /// The commitment and nullifier are not recomputed.
    pub fn verify_kyc_proof(&self, proof: &ZkKycProof) -> ComplianceResult<()> {
        let age = self.ctx.now() - proof.timestamp;
        let max_age = self.ctx.config.proof_max_age_chrono()?;
        if age > max_age {
            tracing::warn!(age_ms = age.num_milliseconds(), "KYC proof expired");
            return Err(ComplianceError::ProofExpired {
                age_ms: age.num_milliseconds(),
                max_ms: max_age.num_milliseconds(),
            });
        }

        if proof.proof.is_empty() {
            return Err(ComplianceError::MalformedProof("empty proof"));
        }
        if proof.commitment.is_empty() {
            return Err(ComplianceError::MalformedProof("empty commitment"));
        }
        if proof.nullifier.is_empty() {
            return Err(ComplianceError::MalformedProof("empty nullifier"));
        }
        if proof.public_inputs.claim_types.is_empty() {
            return Err(ComplianceError::MalformedProof("no public claim types"));
        }

        Ok(())
    }
}
