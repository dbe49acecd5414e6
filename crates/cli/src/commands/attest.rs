//! Attestation commands

use anyhow::Result;
use veil_compliance::{ComplianceAttestation, ComplianceClient};

use crate::AttestAction;

/// Handle attest subcommands
pub fn handle(client: &mut ComplianceClient, action: AttestAction) -> Result<()> {
    match action {
        AttestAction::Create {
            subject,
            compliance_type,
            issuer,
            days,
        } => {
            let att = client.create_attestation(&subject, &compliance_type, &issuer, days)?;
            println!("✅ Attestation {} created", att.id);
            println!("   Subject:     {}", att.subject);
            println!("   Type:        {}", att.compliance_type);
            println!("   Valid until: {}", att.valid_until.to_rfc3339());
            println!("   Proof:       {}", att.proof);
        }

        AttestAction::Verify { attestation_id } => {
            let att = client.verify_attestation(&attestation_id)?;
            println!(
                "✅ Attestation {} is valid ({} for {}, until {})",
                att.id,
                att.compliance_type,
                att.subject,
                att.valid_until.to_rfc3339()
            );
        }

        AttestAction::Revoke { attestation_id } => {
            client.revoke_attestation(&attestation_id)?;
            println!("✅ Attestation {} revoked", attestation_id);
        }

        AttestAction::List { subject } => {
            let attestations = match subject {
                Some(subject) => client.attestations_for(&subject)?,
                None => client.list_attestations()?,
            };
            print_table(client, &attestations);
        }
    }

    Ok(())
}

fn print_table(client: &ComplianceClient, attestations: &[ComplianceAttestation]) {
    if attestations.is_empty() {
        println!("No attestations.");
        return;
    }

    let now = client.context().now();
    println!(
        "{:<34} {:<16} {:<10} {:<26} {}",
        "ID", "SUBJECT", "TYPE", "VALID UNTIL", "STATUS"
    );
    for att in attestations {
        let status = if att.revoked {
            "revoked"
        } else if att.in_window(now) {
            "valid"
        } else {
            "out of window"
        };
        println!(
            "{:<34} {:<16} {:<10} {:<26} {}",
            att.id,
            att.subject,
            att.compliance_type,
            att.valid_until.to_rfc3339(),
            status
        );
    }
}
