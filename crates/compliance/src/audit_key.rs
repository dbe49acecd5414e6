//! Audit Key Registry
//!
//! An audit key is a time-boxed grant that lets a named authority decrypt
//! data within a scope. Keys are soft-deleted: revocation flips the status
//! to [`KeyStatus::Revoked`] and the record stays in the store as an audit
//! trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use strum_macros::{Display, EnumString, IntoStaticStr};
use veil_core::{decrypt, encrypt, generate_key, random_id, CryptoError, EncryptionKey};

use crate::context::ComplianceContext;
use crate::error::{ComplianceError, ComplianceResult};
use crate::store::{MemoryStore, Store};

/// Bytes of randomness in an audit key id
pub const AUDIT_KEY_ID_BYTES: usize = 16;

/// Data an audit key grants access to
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display,
    IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AuditScope {
    Balances,
    Transfers,
    Identity,
    Full,
}

impl AuditScope {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// When a key stops being valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "at", rename_all = "snake_case")]
pub enum Expiry {
    Never,
    At(DateTime<Utc>),
}

impl Expiry {
    /// A key is live while `expires_at > now`
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        match self {
            Expiry::Never => true,
            Expiry::At(expires_at) => *expires_at > now,
        }
    }
}

impl From<Option<DateTime<Utc>>> for Expiry {
    fn from(value: Option<DateTime<Utc>>) -> Self {
        value.map_or(Expiry::Never, Expiry::At)
    }
}

/// Lifecycle state of an audit key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum KeyStatus {
    Active,
    Revoked { at: DateTime<Utc> },
}

/// A decryption grant held by an authority
#[derive(Clone, Serialize, Deserialize)]
pub struct AuditKey {
    pub id: String,
    /// Identity the grant was issued to
    pub authority: String,
    encryption_key: EncryptionKey,
    pub scope: AuditScope,
    pub expiry: Expiry,
    pub label: Option<String>,
    pub jurisdictions: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub status: KeyStatus,
}

impl AuditKey {
    /// Valid iff active and not past its expiry
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, KeyStatus::Active) && self.expiry.is_live_at(now)
    }

    pub fn is_revoked(&self) -> bool {
        matches!(self.status, KeyStatus::Revoked { .. })
    }

    pub fn revoked_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            KeyStatus::Revoked { at } => Some(at),
            KeyStatus::Active => None,
        }
    }

    /// Symmetric key bytes handed to the authority
    pub fn encryption_key(&self) -> &EncryptionKey {
        &self.encryption_key
    }
}

impl fmt::Debug for AuditKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuditKey")
            .field("id", &self.id)
            .field("authority", &self.authority)
            .field("encryption_key", &"<redacted>")
            .field("scope", &self.scope)
            .field("expiry", &self.expiry)
            .field("label", &self.label)
            .field("jurisdictions", &self.jurisdictions)
            .field("created_at", &self.created_at)
            .field("status", &self.status)
            .finish()
    }
}

/// Options for a new audit key
#[derive(Debug, Clone)]
pub struct AuditKeyConfig {
    pub scope: AuditScope,
    /// `None` means the key never expires
    pub expires_at: Option<DateTime<Utc>>,
    pub label: Option<String>,
    pub jurisdictions: Vec<String>,
}

impl AuditKeyConfig {
    pub fn new(scope: AuditScope) -> Self {
        Self {
            scope,
            expires_at: None,
            label: None,
            jurisdictions: Vec::new(),
        }
    }

    pub fn expires_at(mut self, at: DateTime<Utc>) -> Self {
        self.expires_at = Some(at);
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn jurisdiction(mut self, code: impl Into<String>) -> Self {
        self.jurisdictions.push(code.into());
        self
    }
}

/// Registry of audit keys
pub struct AuditKeyRegistry {
    ctx: ComplianceContext,
    store: Box<dyn Store<AuditKey>>,
}

impl AuditKeyRegistry {
    pub fn new(ctx: ComplianceContext, store: Box<dyn Store<AuditKey>>) -> Self {
        Self { ctx, store }
    }

    /// Create a registry backed by a [`MemoryStore`]
    pub fn in_memory(ctx: ComplianceContext) -> Self {
        Self::new(ctx, Box::new(MemoryStore::<AuditKey>::new()))
    }

    /// Issue a new audit key to `authority`
    pub fn add_audit_key(
        &mut self,
        authority: &str,
        config: AuditKeyConfig,
    ) -> ComplianceResult<AuditKey> {
        let key = AuditKey {
            id: random_id::<AUDIT_KEY_ID_BYTES>()?,
            authority: authority.to_string(),
            encryption_key: generate_key()?,
            scope: config.scope,
            expiry: config.expires_at.into(),
            label: config.label,
            jurisdictions: config.jurisdictions.into_iter().collect(),
            created_at: self.ctx.now(),
            status: KeyStatus::Active,
        };

        self.store.put(&key.id, key.clone())?;

        tracing::info!(
            key_id = %key.id,
            authority = %key.authority,
            scope = %key.scope,
            "Audit key created"
        );
        Ok(key)
    }

    /// Revoke a key, returning the revocation instant
    ///
    /// Revoking twice keeps the first instant.
    pub fn revoke_audit_key(&mut self, id: &str) -> ComplianceResult<DateTime<Utc>> {
        let mut key = self.get_audit_key(id)?;

        if let KeyStatus::Revoked { at } = key.status {
            tracing::debug!(key_id = %id, "Audit key already revoked");
            return Ok(at);
        }

        let now = self.ctx.now();
        key.status = KeyStatus::Revoked { at: now };
        self.store.put(id, key)?;

        tracing::info!(key_id = %id, "Audit key revoked");
        Ok(now)
    }

    /// List keys in insertion order
    pub fn list_audit_keys(&self, include_revoked: bool) -> ComplianceResult<Vec<AuditKey>> {
        Ok(self
            .store
            .list()?
            .into_iter()
            .map(|(_, key)| key)
            .filter(|key| include_revoked || !key.is_revoked())
            .collect())
    }

    /// Whether a key is usable right now. Unknown ids are simply invalid.
    pub fn is_audit_key_valid(&self, id: &str) -> bool {
        match self.store.get(id) {
            Ok(Some(key)) => key.is_valid(self.ctx.now()),
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(key_id = %id, error = %e, "Audit key lookup failed");
                false
            }
        }
    }

    pub fn get_audit_key(&self, id: &str) -> ComplianceResult<AuditKey> {
        self.store
            .get(id)?
            .ok_or_else(|| ComplianceError::not_found("Audit key", id))
    }

    /// Encrypt `plaintext` under a currently valid audit key
    pub fn encrypt_for_audit(&self, plaintext: &str, id: &str) -> ComplianceResult<Vec<u8>> {
        let key = match self.store.get(id)? {
            Some(key) if key.is_valid(self.ctx.now()) => key,
            _ => {
                tracing::warn!(key_id = %id, "Refusing to encrypt for invalid audit key");
                return Err(ComplianceError::InvalidOrExpired(id.to_string()));
            }
        };

        let ciphertext = encrypt(&key.encryption_key, plaintext.as_bytes())?;
        tracing::debug!(key_id = %id, bytes = ciphertext.len(), "Encrypted for audit");
        Ok(ciphertext)
    }
}

/// Decrypt audit ciphertext with raw key bytes
///
/// No validity check happens here: possessing the key is the authorisation.
pub fn decrypt_with_audit_key(ciphertext: &[u8], key: &EncryptionKey) -> ComplianceResult<String> {
    let plaintext = decrypt(key, ciphertext)?;
    String::from_utf8(plaintext).map_err(|e| {
        ComplianceError::Crypto(CryptoError::DecryptionFailed(format!(
            "plaintext is not UTF-8: {}",
            e
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplianceConfig;
    use chrono::Duration;
    use std::sync::Arc;
    use veil_core::{Clock, ManualClock};

    fn registry() -> (AuditKeyRegistry, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let ctx = ComplianceContext::with_clock(ComplianceConfig::default(), clock.clone());
        (AuditKeyRegistry::in_memory(ctx), clock)
    }

    #[test]
    fn test_add_key_defaults_to_never_expiring() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Balances))
            .unwrap();

        assert_eq!(key.id.len(), AUDIT_KEY_ID_BYTES * 2);
        assert_eq!(key.expiry, Expiry::Never);
        assert_eq!(key.status, KeyStatus::Active);
        assert!(registry.is_audit_key_valid(&key.id));
    }

    #[test]
    fn test_never_expiring_key_stays_valid() {
        let (mut registry, clock) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();

        clock.advance(Duration::days(365 * 50));
        assert!(registry.is_audit_key_valid(&key.id));
    }

    #[test]
    fn test_key_expires_at_boundary() {
        let (mut registry, clock) = registry();
        let expires_at = clock.now() + Duration::minutes(10);
        let key = registry
            .add_audit_key(
                "regulator-1",
                AuditKeyConfig::new(AuditScope::Transfers).expires_at(expires_at),
            )
            .unwrap();

        clock.advance(Duration::minutes(10) - Duration::milliseconds(1));
        assert!(registry.is_audit_key_valid(&key.id));

        // expires_at > now is required, so equality is already expired
        clock.advance(Duration::milliseconds(1));
        assert!(!registry.is_audit_key_valid(&key.id));
    }

    #[test]
    fn test_revoked_key_is_invalid_from_revocation_on() {
        let (mut registry, clock) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Identity))
            .unwrap();

        let revoked_at = registry.revoke_audit_key(&key.id).unwrap();
        assert_eq!(revoked_at, clock.now());
        assert!(!registry.is_audit_key_valid(&key.id));

        clock.advance(Duration::days(1));
        assert!(!registry.is_audit_key_valid(&key.id));
    }

    #[test]
    fn test_revoke_twice_keeps_first_instant() {
        let (mut registry, clock) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();

        let first = registry.revoke_audit_key(&key.id).unwrap();
        clock.advance(Duration::seconds(30));
        let second = registry.revoke_audit_key(&key.id).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_revoke_unknown_key() {
        let (mut registry, _) = registry();
        let result = registry.revoke_audit_key("missing");
        assert!(matches!(result, Err(ComplianceError::NotFound { .. })));
    }

    #[test]
    fn test_unknown_key_is_invalid() {
        let (registry, _) = registry();
        assert!(!registry.is_audit_key_valid("missing"));
    }

    #[test]
    fn test_list_excludes_revoked_unless_asked() {
        let (mut registry, _) = registry();
        let k1 = registry
            .add_audit_key("auth-a", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();
        let k2 = registry
            .add_audit_key("auth-b", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();
        registry.revoke_audit_key(&k1.id).unwrap();

        let active = registry.list_audit_keys(false).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, k2.id);
        assert!(active.iter().all(|k| k.revoked_at().is_none()));

        let all = registry.list_audit_keys(true).unwrap();
        let ids: Vec<&str> = all.iter().map(|k| k.id.as_str()).collect();
        assert_eq!(ids, vec![k1.id.as_str(), k2.id.as_str()]);
    }

    #[test]
    fn test_config_builder() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key(
                "regulator-eu",
                AuditKeyConfig::new(AuditScope::Transfers)
                    .label("Q3 review")
                    .jurisdiction("EU")
                    .jurisdiction("DE")
                    .jurisdiction("EU"),
            )
            .unwrap();

        assert_eq!(key.label.as_deref(), Some("Q3 review"));
        assert_eq!(key.jurisdictions.len(), 2);
        assert!(key.jurisdictions.contains("DE"));
    }

    #[test]
    fn test_encrypt_decrypt_round_trip() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();

        for plaintext in ["", "balance:1000", "with\0null\0bytes", "üñíçødé"] {
            let ciphertext = registry.encrypt_for_audit(plaintext, &key.id).unwrap();
            let decrypted = decrypt_with_audit_key(&ciphertext, key.encryption_key()).unwrap();
            assert_eq!(decrypted, plaintext);
        }
    }

    #[test]
    fn test_encrypt_requires_valid_key() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();
        registry.revoke_audit_key(&key.id).unwrap();

        let result = registry.encrypt_for_audit("data", &key.id);
        assert!(matches!(result, Err(ComplianceError::InvalidOrExpired(_))));

        let result = registry.encrypt_for_audit("data", "missing");
        assert!(matches!(result, Err(ComplianceError::InvalidOrExpired(_))));
    }

    #[test]
    fn test_decrypt_does_not_check_validity() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();
        let ciphertext = registry.encrypt_for_audit("still readable", &key.id).unwrap();
        registry.revoke_audit_key(&key.id).unwrap();

        let decrypted = decrypt_with_audit_key(&ciphertext, key.encryption_key()).unwrap();
        assert_eq!(decrypted, "still readable");
    }

    #[test]
    fn test_debug_redacts_key_material() {
        let (mut registry, _) = registry();
        let key = registry
            .add_audit_key("regulator-1", AuditKeyConfig::new(AuditScope::Full))
            .unwrap();

        let debug = format!("{:?}", key);
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains(&hex::encode(key.encryption_key())));
    }

    #[test]
    fn test_scope_names() {
        for (scope, name) in [
            (AuditScope::Balances, "balances"),
            (AuditScope::Transfers, "transfers"),
            (AuditScope::Identity, "identity"),
            (AuditScope::Full, "full"),
        ] {
            assert_eq!(scope.as_str(), name);
            assert_eq!(scope.to_string(), name);
            assert_eq!(name.parse::<AuditScope>().unwrap(), scope);
            assert_eq!(serde_json::to_value(scope).unwrap(), serde_json::json!(name));
        }
    }
}
