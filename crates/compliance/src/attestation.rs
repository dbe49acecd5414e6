//! Attestation Registry
//!
//! Time-bounded, revocable assertions that an issuer makes about a
//! subject's compliance status. `revoked` is the only field that changes
//! after creation and it never goes back to `false`.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use veil_core::{random_id, sha256_hex};

use crate::context::ComplianceContext;
use crate::error::{ComplianceError, ComplianceResult};
use crate::store::{MemoryStore, Store};

/// A compliance attestation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceAttestation {
    pub id: String,
    pub subject: String,
    /// Free-form, e.g. "kyc", "aml", "accredited"
    pub compliance_type: String,
    pub issuer: String,
    /// `sha256("subject:type:created_ms")`
    pub proof: String,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub revoked: bool,
}

impl ComplianceAttestation {
    /// Valid iff not revoked and `valid_from <= now <= valid_until`
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        !self.revoked && self.in_window(now)
    }

    pub fn in_window(&self, now: DateTime<Utc>) -> bool {
        self.valid_from <= now && now <= self.valid_until
    }
}

/// Registry of compliance attestations
pub struct AttestationRegistry {
    ctx: ComplianceContext,
    store: Box<dyn Store<ComplianceAttestation>>,
}

impl AttestationRegistry {
    pub fn new(ctx: ComplianceContext, store: Box<dyn Store<ComplianceAttestation>>) -> Self {
        Self { ctx, store }
    }

    pub fn in_memory(ctx: ComplianceContext) -> Self {
        Self::new(ctx, Box::new(MemoryStore::<ComplianceAttestation>::new()))
    }

    /// Issue an attestation valid from now for `validity_days`
    pub fn create_attestation(
        &mut self,
        subject: &str,
        compliance_type: &str,
        issuer: &str,
        validity_days: u32,
    ) -> ComplianceResult<ComplianceAttestation> {
        let now = self.ctx.now();
        let valid_until = Duration::try_days(i64::from(validity_days))
            .and_then(|validity| now.checked_add_signed(validity))
            .ok_or_else(|| ComplianceError::InvalidValidity(format!("{} days", validity_days)))?;

        let proof = sha256_hex(format!(
            "{}:{}:{}",
            subject,
            compliance_type,
            now.timestamp_millis()
        ));

        let attestation = ComplianceAttestation {
            id: random_id::<16>()?,
            subject: subject.to_string(),
            compliance_type: compliance_type.to_string(),
            issuer: issuer.to_string(),
            proof,
            valid_from: now,
            valid_until,
            revoked: false,
        };

        self.store.put(&attestation.id, attestation.clone())?;

        tracing::info!(
            attestation_id = %attestation.id,
            subject = %subject,
            compliance_type = %compliance_type,
            validity_days,
            "Attestation created"
        );
        Ok(attestation)
    }

    pub fn get_attestation(&self, id: &str) -> ComplianceResult<ComplianceAttestation> {
        self.store
            .get(id)?
            .ok_or_else(|| ComplianceError::not_found("Attestation", id))
    }

    /// Check order: existence, revocation, then the time window
    pub fn verify_attestation(&self, id: &str) -> ComplianceResult<ComplianceAttestation> {
        let attestation = self.get_attestation(id)?;

        if attestation.revoked {
            return Err(ComplianceError::Revoked(id.to_string()));
        }
        if !attestation.in_window(self.ctx.now()) {
            return Err(ComplianceError::OutOfValidityWindow(id.to_string()));
        }

        Ok(attestation)
    }

    /// Irreversibly revoke an attestation
    pub fn revoke_attestation(&mut self, id: &str) -> ComplianceResult<()> {
        let mut attestation = self.get_attestation(id)?;
        if attestation.revoked {
            return Ok(());
        }

        attestation.revoked = true;
        self.store.put(id, attestation)?;

        tracing::info!(attestation_id = %id, "Attestation revoked");
        Ok(())
    }

    /// All attestations about `subject`, in creation order
    pub fn attestations_for(&self, subject: &str) -> ComplianceResult<Vec<ComplianceAttestation>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|(_, a)| a)
            .filter(|a| a.subject == subject)
            .collect())
    }

    pub fn list_attestations(&self) -> ComplianceResult<Vec<ComplianceAttestation>> {
        Ok(self.store.list()?.into_iter().map(|(_, a)| a).collect())
    }
}
