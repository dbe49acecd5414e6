//! Compliance Client - composition root
//!
//! Wires the context, the four registries and the ledger together. Every
//! successful mutation (and every generated proof) is appended to the
//! ledger; failed operations leave no trace there.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use std::path::Path;
use veil_core::EncryptionKey;

use crate::attestation::{AttestationRegistry, ComplianceAttestation};
use crate::audit_key::{decrypt_with_audit_key, AuditKey, AuditKeyConfig, AuditKeyRegistry};
use crate::config::ComplianceConfig;
use crate::context::ComplianceContext;
use crate::disclosure::{self, DisclosureRequest, DisclosureResponse};
use crate::error::ComplianceResult;
use crate::event::ComplianceEvent;
use crate::kyc::{ClaimType, KycClaim, KycRegistry, ZkKycProof};
use crate::ledger::ComplianceLedger;
use crate::store::JsonFileStore;

pub const AUDIT_KEYS_FILE: &str = "audit_keys.json";
pub const KYC_CLAIMS_FILE: &str = "kyc_claims.json";
pub const ATTESTATIONS_FILE: &str = "attestations.json";
pub const LEDGER_FILE: &str = "compliance.jsonl";

/// Front door to the compliance registry
pub struct ComplianceClient {
    ctx: ComplianceContext,
    audit_keys: AuditKeyRegistry,
    kyc: KycRegistry,
    attestations: AttestationRegistry,
    ledger: ComplianceLedger,
}

impl ComplianceClient {
    /// Assemble a client from pre-built parts
    pub fn from_parts(
        ctx: ComplianceContext,
        audit_keys: AuditKeyRegistry,
        kyc: KycRegistry,
        attestations: AttestationRegistry,
        ledger: ComplianceLedger,
    ) -> Self {
        Self {
            ctx,
            audit_keys,
            kyc,
            attestations,
            ledger,
        }
    }

    /// Memory-backed client on the system clock
    pub fn in_memory(config: ComplianceConfig) -> ComplianceResult<Self> {
        config.validate()?;
        Ok(Self::in_memory_with_context(ComplianceContext::new(config)))
    }

    /// Memory-backed client on a caller-built context
    pub fn in_memory_with_context(ctx: ComplianceContext) -> Self {
        Self::from_parts(
            ctx.clone(),
            AuditKeyRegistry::in_memory(ctx.clone()),
            KycRegistry::in_memory(ctx.clone()),
            AttestationRegistry::in_memory(ctx),
            ComplianceLedger::in_memory(),
        )
    }

    /// File-backed client rooted at `dir`
    ///
    /// The ledger goes to `config.ledger_path` when set, otherwise to
    /// `dir/compliance.jsonl`.
    pub fn open(dir: impl AsRef<Path>, config: ComplianceConfig) -> ComplianceResult<Self> {
        config.validate()?;
        Self::open_with_context(dir, ComplianceContext::new(config))
    }

    pub fn open_with_context(dir: impl AsRef<Path>, ctx: ComplianceContext) -> ComplianceResult<Self> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let ledger_path = ctx
            .config
            .ledger_path
            .clone()
            .unwrap_or_else(|| dir.join(LEDGER_FILE));

        let client = Self::from_parts(
            ctx.clone(),
            AuditKeyRegistry::new(
                ctx.clone(),
                Box::new(JsonFileStore::<AuditKey>::open(dir.join(AUDIT_KEYS_FILE))?),
            ),
            KycRegistry::new(
                ctx.clone(),
                Box::new(JsonFileStore::<KycClaim>::open(dir.join(KYC_CLAIMS_FILE))?),
            ),
            AttestationRegistry::new(
                ctx,
                Box::new(JsonFileStore::<ComplianceAttestation>::open(
                    dir.join(ATTESTATIONS_FILE),
                )?),
            ),
            ComplianceLedger::open(&ledger_path)?,
        );

        tracing::info!(
            data_dir = %dir.display(),
            ledger = %ledger_path.display(),
            cluster = %client.ctx.connection.cluster,
            "Compliance client opened"
        );
        Ok(client)
    }

    pub fn context(&self) -> &ComplianceContext {
        &self.ctx
    }

    pub fn ledger(&self) -> &ComplianceLedger {
        &self.ledger
    }

    // === Audit keys ===

    pub fn add_audit_key(
        &mut self,
        authority: &str,
        config: AuditKeyConfig,
    ) -> ComplianceResult<AuditKey> {
        let key = self.audit_keys.add_audit_key(authority, config)?;
        self.ledger.append(&ComplianceEvent::audit_key_created(&key))?;
        Ok(key)
    }

    pub fn revoke_audit_key(&mut self, id: &str) -> ComplianceResult<DateTime<Utc>> {
        let already_revoked = self.audit_keys.get_audit_key(id)?.is_revoked();
        let at = self.audit_keys.revoke_audit_key(id)?;
        if !already_revoked {
            self.ledger.append(&ComplianceEvent::audit_key_revoked(id, at))?;
        }
        Ok(at)
    }

    pub fn list_audit_keys(&self, include_revoked: bool) -> ComplianceResult<Vec<AuditKey>> {
        self.audit_keys.list_audit_keys(include_revoked)
    }

    pub fn is_audit_key_valid(&self, id: &str) -> bool {
        self.audit_keys.is_audit_key_valid(id)
    }

    pub fn get_audit_key(&self, id: &str) -> ComplianceResult<AuditKey> {
        self.audit_keys.get_audit_key(id)
    }

    pub fn encrypt_for_audit(&mut self, plaintext: &str, id: &str) -> ComplianceResult<Vec<u8>> {
        let ciphertext = self.audit_keys.encrypt_for_audit(plaintext, id)?;
        self.ledger.append(&ComplianceEvent::audit_encryption(
            id,
            ciphertext.len(),
            self.ctx.now(),
        ))?;
        Ok(ciphertext)
    }

    pub fn decrypt_with_audit_key(
        ciphertext: &[u8],
        key: &EncryptionKey,
    ) -> ComplianceResult<String> {
        decrypt_with_audit_key(ciphertext, key)
    }

    // === KYC ===

    pub fn store_kyc_claim(&mut self, claim: KycClaim) -> ComplianceResult<String> {
        let claim_type = claim.claim_type;
        let claim_id = self.kyc.store_kyc_claim(claim)?;
        self.ledger.append(&ComplianceEvent::kyc_claim_stored(
            &claim_id,
            claim_type,
            self.ctx.now(),
        ))?;
        Ok(claim_id)
    }

    pub fn list_kyc_claims(&self) -> ComplianceResult<Vec<(String, KycClaim)>> {
        self.kyc.list_kyc_claims()
    }

    pub fn get_kyc_claim(&self, claim_id: &str) -> ComplianceResult<KycClaim> {
        self.kyc.get_kyc_claim(claim_id)
    }

    pub fn generate_kyc_proof(
        &mut self,
        claim_types: &[ClaimType],
        requirements: &Value,
    ) -> ComplianceResult<ZkKycProof> {
        let proof = self.kyc.generate_kyc_proof(claim_types, requirements)?;
        self.ledger.append(&ComplianceEvent::kyc_proof_generated(&proof))?;
        Ok(proof)
    }

    pub fn verify_kyc_proof(&self, proof: &ZkKycProof) -> ComplianceResult<()> {
        self.kyc.verify_kyc_proof(proof)
    }

    // === Attestations ===

    /// `validity_days = None` uses the configured default
    pub fn create_attestation(
        &mut self,
        subject: &str,
        compliance_type: &str,
        issuer: &str,
        validity_days: Option<u32>,
    ) -> ComplianceResult<ComplianceAttestation> {
        let days = validity_days.unwrap_or(self.ctx.config.default_attestation_validity_days);
        let attestation = self
            .attestations
            .create_attestation(subject, compliance_type, issuer, days)?;
        self.ledger
            .append(&ComplianceEvent::attestation_created(&attestation))?;
        Ok(attestation)
    }

    pub fn verify_attestation(&self, id: &str) -> ComplianceResult<ComplianceAttestation> {
        self.attestations.verify_attestation(id)
    }

    pub fn revoke_attestation(&mut self, id: &str) -> ComplianceResult<()> {
        let already_revoked = self.attestations.get_attestation(id)?.revoked;
        self.attestations.revoke_attestation(id)?;
        if !already_revoked {
            self.ledger
                .append(&ComplianceEvent::attestation_revoked(id, self.ctx.now()))?;
        }
        Ok(())
    }

    pub fn attestations_for(&self, subject: &str) -> ComplianceResult<Vec<ComplianceAttestation>> {
        self.attestations.attestations_for(subject)
    }

    pub fn list_attestations(&self) -> ComplianceResult<Vec<ComplianceAttestation>> {
        self.attestations.list_attestations()
    }

    // === Selective disclosure ===

    pub fn create_disclosure(
        &mut self,
        request: &DisclosureRequest,
        full_data: &Map<String, Value>,
        key: &EncryptionKey,
    ) -> ComplianceResult<DisclosureResponse> {
        let response = disclosure::create_disclosure(&self.ctx, request, full_data, key)?;
        self.ledger.append(&ComplianceEvent::disclosure_created(
            &response.request_id,
            &request.requester,
            &request.purpose,
            &request.requested_fields,
            response.timestamp,
        ))?;
        Ok(response)
    }

    pub fn open_disclosure(
        response: &DisclosureResponse,
        key: &EncryptionKey,
    ) -> ComplianceResult<Map<String, Value>> {
        disclosure::open_disclosure(response, key)
    }
}
