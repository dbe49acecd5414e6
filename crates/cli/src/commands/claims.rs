//! KYC claim and proof commands

use anyhow::{Context, Result};
use serde_json::Value;
use veil_compliance::{ClaimValue, ComplianceClient, KycClaim, ZkKycProof};

use super::{days_from, emit_json, read_json};
use crate::ClaimAction;

/// Handle claim subcommands
pub fn handle(client: &mut ComplianceClient, action: ClaimAction) -> Result<()> {
    match action {
        ClaimAction::Store {
            claim_type,
            value,
            issuer,
            expires_in_days,
        } => {
            let now = client.context().now();
            let mut claim = KycClaim::new(claim_type, parse_claim_value(&value), now);
            if let Some(issuer) = issuer {
                claim = claim.with_issuer(issuer);
            }
            if let Some(days) = expires_in_days {
                claim = claim.with_expiry(days_from(now, days)?);
            }

            let claim_id = client.store_kyc_claim(claim)?;
            println!("✅ Stored {} claim ({})", claim_type, claim_id);
        }

        ClaimAction::List => {
            let claims = client.list_kyc_claims()?;
            if claims.is_empty() {
                println!("No claims stored.");
                return Ok(());
            }

            let now = client.context().now();
            println!("{:<34} {:<22} {:<12} {}", "ID", "TYPE", "ISSUER", "STATUS");
            for (id, claim) in claims {
                let status = if claim.is_expired(now) { "expired" } else { "live" };
                println!(
                    "{:<34} {:<22} {:<12} {}",
                    id,
                    claim.claim_type.as_str(),
                    claim.issuer.as_deref().unwrap_or("-"),
                    status
                );
            }
        }

        ClaimAction::Prove {
            claim_types,
            requirements,
            output,
        } => {
            let requirements: Value =
                serde_json::from_str(&requirements).context("--requirements is not valid JSON")?;
            let proof = client.generate_kyc_proof(&claim_types, &requirements)?;
            emit_json(&serde_json::to_value(&proof)?, output.as_deref())?;
        }

        ClaimAction::Verify { proof } => {
            let proof: ZkKycProof = read_json(&proof)?;
            client.verify_kyc_proof(&proof)?;
            println!(
                "✅ Proof accepted ({} claim types, nullifier {})",
                proof.public_inputs.claim_types.len(),
                proof.nullifier
            );
        }
    }

    Ok(())
}

/// `true`/`false` become booleans, integers become numbers, anything else is text
fn parse_claim_value(raw: &str) -> ClaimValue {
    match raw {
        "true" => ClaimValue::from(true),
        "false" => ClaimValue::from(false),
        _ => match raw.parse::<i64>() {
            Ok(n) => ClaimValue::from(n),
            Err(_) => ClaimValue::from(raw),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_claim_value() {
        assert_eq!(parse_claim_value("true"), ClaimValue::Bool(true));
        assert_eq!(parse_claim_value("21"), ClaimValue::from(21i64));
        assert_eq!(parse_claim_value("CH"), ClaimValue::Text("CH".to_string()));
    }
}
