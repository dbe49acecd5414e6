//! Selective Disclosure Engine
//!
//! Reveals only the requested subset of a private record, encrypted under a
//! key the caller shares with the requester. Nothing is persisted; binding a
//! response back to its request is the caller's job.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use veil_core::{decrypt, encrypt, random_id, sha256_hex, EncryptionKey};

use crate::context::ComplianceContext;
use crate::error::{ComplianceError, ComplianceResult};

/// What a requester wants to see and why
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureRequest {
    pub requester: String,
    pub requested_fields: Vec<String>,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
}

/// Encrypted subset handed back to the requester
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisclosureResponse {
    pub request_id: String,
    /// `nonce || ciphertext || tag` of the filtered JSON object
    pub encrypted_data: Vec<u8>,
    /// `sha256(requester + ":" + sorted fields joined by ",")`
    pub proof: String,
    pub timestamp: DateTime<Utc>,
}

/// Integrity tag over the requester and the (sorted, deduplicated) field names
pub fn disclosure_proof(requester: &str, fields: &[String]) -> String {
    let mut sorted: Vec<&str> = fields.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sha256_hex(format!("{}:{}", requester, sorted.join(",")))
}

/// Copy only the requested fields that exist in `full_data`
pub fn filter_fields(requested: &[String], full_data: &Map<String, Value>) -> Map<String, Value> {
    requested
        .iter()
        .filter_map(|field| full_data.get(field).map(|v| (field.clone(), v.clone())))
        .collect()
}

/// Filter, serialize and encrypt the requested fields
///
/// Requested fields missing from `full_data` are skipped silently.
/// A request that has already expired is refused.
pub fn create_disclosure(
    ctx: &ComplianceContext,
    request: &DisclosureRequest,
    full_data: &Map<String, Value>,
    key: &EncryptionKey,
) -> ComplianceResult<DisclosureResponse> {
    let now = ctx.now();
    if request.expires_at <= now {
        tracing::warn!(requester = %request.requester, "Disclosure request expired");
        return Err(ComplianceError::RequestExpired);
    }

    let disclosed = filter_fields(&request.requested_fields, full_data);
    let payload = serde_json::to_vec(&disclosed)?;
    let encrypted_data = encrypt(key, &payload)?;

    tracing::info!(
        requester = %request.requester,
        purpose = %request.purpose,
        requested = request.requested_fields.len(),
        disclosed = disclosed.len(),
        "Disclosure created"
    );

    Ok(DisclosureResponse {
        request_id: random_id::<16>()?,
        encrypted_data,
        proof: disclosure_proof(&request.requester, &request.requested_fields),
        timestamp: now,
    })
}

/// Decrypt a disclosure back into its JSON object (requester side)
pub fn open_disclosure(
    response: &DisclosureResponse,
    key: &EncryptionKey,
) -> ComplianceResult<Map<String, Value>> {
    let plaintext = decrypt(key, &response.encrypted_data)?;
    Ok(serde_json::from_slice(&plaintext)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ComplianceConfig;
    use chrono::Duration;
    use serde_json::json;
    use std::sync::Arc;
    use veil_core::{generate_key, Clock, ManualClock};

    fn context() -> (ComplianceContext, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let ctx = ComplianceContext::with_clock(ComplianceConfig::default(), clock.clone());
        (ctx, clock)
    }

    fn request(fields: &[&str], expires_at: DateTime<Utc>) -> DisclosureRequest {
        DisclosureRequest {
            requester: "auditor-1".to_string(),
            requested_fields: fields.iter().map(|f| f.to_string()).collect(),
            purpose: "annual audit".to_string(),
            expires_at,
        }
    }

    fn data(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_only_requested_present_fields_disclosed() {
        let (ctx, clock) = context();
        let key = generate_key().unwrap();
        let full = data(json!({ "a": 1, "b": 2 }));

        let response = create_disclosure(
            &ctx,
            &request(&["a", "c"], clock.now() + Duration::hours(1)),
            &full,
            &key,
        )
        .unwrap();

        let opened = open_disclosure(&response, &key).unwrap();
        assert_eq!(Value::Object(opened), json!({ "a": 1 }));
    }

    #[test]
    fn test_proof_uses_sorted_fields() {
        let fields = vec!["zip".to_string(), "name".to_string(), "dob".to_string()];
        assert_eq!(
            disclosure_proof("auditor-1", &fields),
            sha256_hex("auditor-1:dob,name,zip")
        );

        let shuffled = vec!["name".to_string(), "dob".to_string(), "zip".to_string()];
        assert_eq!(
            disclosure_proof("auditor-1", &fields),
            disclosure_proof("auditor-1", &shuffled)
        );
        assert_ne!(
            disclosure_proof("auditor-1", &fields),
            disclosure_proof("auditor-2", &fields)
        );
    }

    #[test]
    fn test_fresh_request_id_each_call() {
        let (ctx, clock) = context();
        let key = generate_key().unwrap();
        let full = data(json!({ "a": 1 }));
        let req = request(&["a"], clock.now() + Duration::hours(1));

        let r1 = create_disclosure(&ctx, &req, &full, &key).unwrap();
        let r2 = create_disclosure(&ctx, &req, &full, &key).unwrap();

        assert_ne!(r1.request_id, r2.request_id);
        assert_eq!(r1.proof, r2.proof);
        assert_eq!(r1.timestamp, clock.now());
    }

    #[test]
    fn test_no_matching_fields_gives_empty_object() {
        let (ctx, clock) = context();
        let key = generate_key().unwrap();
        let full = data(json!({ "a": 1 }));

        let response = create_disclosure(
            &ctx,
            &request(&["x", "y"], clock.now() + Duration::hours(1)),
            &full,
            &key,
        )
        .unwrap();

        assert!(open_disclosure(&response, &key).unwrap().is_empty());
    }

    #[test]
    fn test_expired_request_refused() {
        let (ctx, clock) = context();
        let key = generate_key().unwrap();
        let full = data(json!({ "a": 1 }));

        let result = create_disclosure(&ctx, &request(&["a"], clock.now()), &full, &key);
        assert!(matches!(result, Err(ComplianceError::RequestExpired)));
    }

    #[test]
    fn test_wrong_key_cannot_open() {
        let (ctx, clock) = context();
        let key = generate_key().unwrap();
        let other = generate_key().unwrap();
        let full = data(json!({ "ssn": "123-45-6789" }));

        let response = create_disclosure(
            &ctx,
            &request(&["ssn"], clock.now() + Duration::hours(1)),
            &full,
            &key,
        )
        .unwrap();

        assert!(matches!(
            open_disclosure(&response, &other),
            Err(ComplianceError::Crypto(_))
        ));
    }
}
