//! Audit key commands

use anyhow::{Context, Result};
use veil_compliance::{AuditKeyConfig, ComplianceClient, Expiry, KeyStatus};
use veil_core::key_from_hex;

use super::days_from;
use crate::KeyAction;

/// Handle key subcommands
pub fn handle(client: &mut ComplianceClient, action: KeyAction) -> Result<()> {
    match action {
        KeyAction::Add {
            authority,
            scope,
            expires_in_days,
            label,
            jurisdictions,
        } => {
            let mut config = AuditKeyConfig::new(scope.to_core_type());
            if let Some(days) = expires_in_days {
                config = config.expires_at(days_from(client.context().now(), days)?);
            }
            if let Some(label) = label {
                config = config.label(label);
            }
            for code in jurisdictions {
                config = config.jurisdiction(code);
            }

            let key = client.add_audit_key(&authority, config)?;
            println!("✅ Audit key issued to {}", key.authority);
            println!("   ID:     {}", key.id);
            println!("   Scope:  {}", key.scope);
            println!("   Key:    {}", hex::encode(key.encryption_key()));
            println!();
            println!("Hand the key to the authority over a secure channel.");
        }

        KeyAction::Revoke { key_id } => {
            let at = client.revoke_audit_key(&key_id)?;
            println!("✅ Audit key {} revoked at {}", key_id, at.to_rfc3339());
        }

        KeyAction::List { all } => {
            let keys = client.list_audit_keys(all)?;
            if keys.is_empty() {
                println!("No audit keys.");
                return Ok(());
            }

            println!(
                "{:<34} {:<20} {:<10} {:<26} {}",
                "ID", "AUTHORITY", "SCOPE", "EXPIRES", "STATUS"
            );
            let now = client.context().now();
            for key in keys {
                let expires = match key.expiry {
                    Expiry::Never => "never".to_string(),
                    Expiry::At(at) => at.to_rfc3339(),
                };
                let status = match key.status {
                    KeyStatus::Revoked { .. } => "revoked",
                    KeyStatus::Active if key.is_valid(now) => "active",
                    KeyStatus::Active => "expired",
                };
                println!(
                    "{:<34} {:<20} {:<10} {:<26} {}",
                    key.id, key.authority, key.scope.as_str(), expires, status
                );
            }
        }

        KeyAction::Encrypt { key_id, plaintext } => {
            let ciphertext = client.encrypt_for_audit(&plaintext, &key_id)?;
            println!("{}", hex::encode(ciphertext));
        }

        KeyAction::Decrypt { ciphertext, key } => {
            let key = key_from_hex(&key).context("invalid --key")?;
            let ciphertext = hex::decode(ciphertext.trim()).context("ciphertext is not valid hex")?;
            let plaintext = ComplianceClient::decrypt_with_audit_key(&ciphertext, &key)?;
            println!("{}", plaintext);
        }
    }

    Ok(())
}
