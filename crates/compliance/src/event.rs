//! Compliance events (written to the Compliance Ledger)
//!
//! One event per registry mutation or generated proof. Events carry ids,
//! identities and hashes only; key bytes and claim values never appear.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::audit_key::{AuditKey, AuditScope, Expiry};
use crate::attestation::ComplianceAttestation;
use crate::kyc::{ClaimType, ZkKycProof};

/// Events appended to the Compliance Ledger (append-only JSONL)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum ComplianceEvent {
    AuditKeyCreated {
        id: String,
        key_id: String,
        authority: String,
        scope: AuditScope,
        expiry: Expiry,
        timestamp: DateTime<Utc>,
    },

    AuditKeyRevoked {
        id: String,
        key_id: String,
        timestamp: DateTime<Utc>,
    },

    /// Data was encrypted for an audit key holder
    AuditEncryption {
        id: String,
        key_id: String,
        ciphertext_len: usize,
        timestamp: DateTime<Utc>,
    },

    KycClaimStored {
        id: String,
        claim_id: String,
        claim_type: ClaimType,
        timestamp: DateTime<Utc>,
    },

    KycProofGenerated {
        id: String,
        claim_types: Vec<ClaimType>,
        commitment: String,
        timestamp: DateTime<Utc>,
    },

    AttestationCreated {
        id: String,
        attestation_id: String,
        subject: String,
        compliance_type: String,
        issuer: String,
        valid_until: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    AttestationRevoked {
        id: String,
        attestation_id: String,
        timestamp: DateTime<Utc>,
    },

    DisclosureCreated {
        id: String,
        request_id: String,
        requester: String,
        purpose: String,
        fields: Vec<String>,
        timestamp: DateTime<Utc>,
    },
}

fn event_id() -> String {
    Uuid::new_v4().to_string()
}

impl ComplianceEvent {
    pub fn audit_key_created(key: &AuditKey) -> Self {
        ComplianceEvent::AuditKeyCreated {
            id: event_id(),
            key_id: key.id.clone(),
            authority: key.authority.clone(),
            scope: key.scope,
            expiry: key.expiry,
            timestamp: key.created_at,
        }
    }

    pub fn audit_key_revoked(key_id: &str, timestamp: DateTime<Utc>) -> Self {
        ComplianceEvent::AuditKeyRevoked {
            id: event_id(),
            key_id: key_id.to_string(),
            timestamp,
        }
    }

    pub fn audit_encryption(key_id: &str, ciphertext_len: usize, timestamp: DateTime<Utc>) -> Self {
        ComplianceEvent::AuditEncryption {
            id: event_id(),
            key_id: key_id.to_string(),
            ciphertext_len,
            timestamp,
        }
    }

    pub fn kyc_claim_stored(claim_id: &str, claim_type: ClaimType, timestamp: DateTime<Utc>) -> Self {
        ComplianceEvent::KycClaimStored {
            id: event_id(),
            claim_id: claim_id.to_string(),
            claim_type,
            timestamp,
        }
    }

    pub fn kyc_proof_generated(proof: &ZkKycProof) -> Self {
        ComplianceEvent::KycProofGenerated {
            id: event_id(),
            claim_types: proof.public_inputs.claim_types.clone(),
            commitment: proof.commitment.clone(),
            timestamp: proof.timestamp,
        }
    }

    pub fn attestation_created(attestation: &ComplianceAttestation) -> Self {
        ComplianceEvent::AttestationCreated {
            id: event_id(),
            attestation_id: attestation.id.clone(),
            subject: attestation.subject.clone(),
            compliance_type: attestation.compliance_type.clone(),
            issuer: attestation.issuer.clone(),
            valid_until: attestation.valid_until,
            timestamp: attestation.valid_from,
        }
    }

    pub fn attestation_revoked(attestation_id: &str, timestamp: DateTime<Utc>) -> Self {
        ComplianceEvent::AttestationRevoked {
            id: event_id(),
            attestation_id: attestation_id.to_string(),
            timestamp,
        }
    }

    pub fn disclosure_created(
        request_id: &str,
        requester: &str,
        purpose: &str,
        fields: &[String],
        timestamp: DateTime<Utc>,
    ) -> Self {
        ComplianceEvent::DisclosureCreated {
            id: event_id(),
            request_id: request_id.to_string(),
            requester: requester.to_string(),
            purpose: purpose.to_string(),
            fields: fields.to_vec(),
            timestamp,
        }
    }

    /// Get the event ID
    pub fn id(&self) -> &str {
        match self {
            ComplianceEvent::AuditKeyCreated { id, .. }
            | ComplianceEvent::AuditKeyRevoked { id, .. }
            | ComplianceEvent::AuditEncryption { id, .. }
            | ComplianceEvent::KycClaimStored { id, .. }
            | ComplianceEvent::KycProofGenerated { id, .. }
            | ComplianceEvent::AttestationCreated { id, .. }
            | ComplianceEvent::AttestationRevoked { id, .. }
            | ComplianceEvent::DisclosureCreated { id, .. } => id,
        }
    }

    /// Get the timestamp
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ComplianceEvent::AuditKeyCreated { timestamp, .. }
            | ComplianceEvent::AuditKeyRevoked { timestamp, .. }
            | ComplianceEvent::AuditEncryption { timestamp, .. }
            | ComplianceEvent::KycClaimStored { timestamp, .. }
            | ComplianceEvent::KycProofGenerated { timestamp, .. }
            | ComplianceEvent::AttestationCreated { timestamp, .. }
            | ComplianceEvent::AttestationRevoked { timestamp, .. }
            | ComplianceEvent::DisclosureCreated { timestamp, .. } => *timestamp,
        }
    }

    /// Serde tag of the event, for display
    pub fn event_type(&self) -> &'static str {
        match self {
            ComplianceEvent::AuditKeyCreated { .. } => "audit_key_created",
            ComplianceEvent::AuditKeyRevoked { .. } => "audit_key_revoked",
            ComplianceEvent::AuditEncryption { .. } => "audit_encryption",
            ComplianceEvent::KycClaimStored { .. } => "kyc_claim_stored",
            ComplianceEvent::KycProofGenerated { .. } => "kyc_proof_generated",
            ComplianceEvent::AttestationCreated { .. } => "attestation_created",
            ComplianceEvent::AttestationRevoked { .. } => "attestation_revoked",
            ComplianceEvent::DisclosureCreated { .. } => "disclosure_created",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tag_matches_event_type() {
        let now = Utc::now();
        let events = vec![
            ComplianceEvent::audit_key_revoked("key-1", now),
            ComplianceEvent::audit_encryption("key-1", 44, now),
            ComplianceEvent::kyc_claim_stored("claim-1", ClaimType::AgeOver18, now),
            ComplianceEvent::attestation_revoked("att-1", now),
            ComplianceEvent::disclosure_created("req-1", "auditor", "audit", &["a".to_string()], now),
        ];

        for event in events {
            let json = serde_json::to_value(&event).unwrap();
            assert_eq!(json["event_type"], event.event_type());
            assert_eq!(json["id"], event.id());
        }
    }

    #[test]
    fn test_event_round_trip() {
        let event = ComplianceEvent::kyc_claim_stored("claim-9", ClaimType::KycVerified, Utc::now());
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ComplianceEvent = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, event);
        assert!(json.contains("\"claim_type\":\"kyc_verified\""));
    }

    #[test]
    fn test_event_ids_unique() {
        let now = Utc::now();
        let a = ComplianceEvent::audit_key_revoked("key-1", now);
        let b = ComplianceEvent::audit_key_revoked("key-1", now);
        assert_ne!(a.id(), b.id());
    }
}
