//! Veil CLI - Compliance registry from the command line
//!
//! Usage:
//! ```bash
//! veil key add sec-regulator --scope transfers --expires-in-days 90
//! veil key encrypt <KEY_ID> "transfer:500:USDC"
//! veil claim store age_over_18 true --issuer civic
//! veil claim prove age_over_18,kyc_verified --output proof.json
//! veil claim verify proof.json
//! veil attest create wallet-7xK kyc issuer-veil --days 30
//! veil disclose create request.json record.json --key <HEX>
//! veil ledger --from 0 --limit 20
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use strum::IntoEnumIterator;
use tracing_subscriber::EnvFilter;
use veil_compliance::{AuditScope, ClaimType, ComplianceClient, ComplianceConfig};

mod commands;

use commands::{attest, claims, disclose, keys, ledger};

/// Veil - compliance registry for private transfers
#[derive(Parser)]
#[command(name = "veil")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data", global = true)]
    pub data: PathBuf,

    /// JSON config file (defaults are used when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level when RUST_LOG is not set
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Audit key management
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// KYC claims and proofs
    Claim {
        #[command(subcommand)]
        action: ClaimAction,
    },

    /// Compliance attestations
    Attest {
        #[command(subcommand)]
        action: AttestAction,
    },

    /// Selective disclosure
    Disclose {
        #[command(subcommand)]
        action: DiscloseAction,
    },

    /// Show the compliance ledger
    Ledger {
        /// First line to show (0-based)
        #[arg(long, default_value = "0")]
        from: usize,
        /// Maximum number of events to show
        #[arg(long)]
        limit: Option<usize>,
        /// Print raw JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum KeyAction {
    /// Issue a new audit key to an authority
    Add {
        /// Authority receiving the key
        authority: String,
        /// Data the key may decrypt
        #[arg(long, default_value = "full")]
        scope: ScopeArg,
        /// Days until the key expires (never, when omitted)
        #[arg(long)]
        expires_in_days: Option<i64>,
        /// Free-form label
        #[arg(long)]
        label: Option<String>,
        /// Jurisdiction codes (comma-separated)
        #[arg(long, value_delimiter = ',')]
        jurisdictions: Vec<String>,
    },
    /// Revoke an audit key
    Revoke {
        /// Audit key ID
        key_id: String,
    },
    /// List audit keys
    List {
        /// Include revoked keys
        #[arg(long)]
        all: bool,
    },
    /// Encrypt a plaintext for an audit key (prints hex)
    Encrypt {
        /// Audit key ID
        key_id: String,
        /// Plaintext to encrypt
        plaintext: String,
    },
    /// Decrypt hex ciphertext with a raw key
    Decrypt {
        /// Ciphertext (hex)
        ciphertext: String,
        /// Encryption key (hex, 32 bytes)
        #[arg(long)]
        key: String,
    },
}

#[derive(Subcommand)]
pub enum ClaimAction {
    /// Store a KYC claim
    Store {
        /// Claim type (e.g., age_over_18, country_of_residence)
        #[arg(value_parser = parse_claim_type)]
        claim_type: ClaimType,
        /// Claim value: true/false, an integer, or text
        value: String,
        /// Issuer of the claim
        #[arg(long)]
        issuer: Option<String>,
        /// Days until the claim expires
        #[arg(long)]
        expires_in_days: Option<i64>,
    },
    /// List stored claims
    List,
    /// Generate a KYC proof (printed as JSON)
    Prove {
        /// Required claim types (comma-separated)
        #[arg(value_delimiter = ',', required = true, value_parser = parse_claim_type)]
        claim_types: Vec<ClaimType>,
        /// Requirements object (JSON)
        #[arg(long, default_value = "{}")]
        requirements: String,
        /// Write the proof to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Verify a KYC proof from a JSON file
    Verify {
        /// Proof file
        proof: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum AttestAction {
    /// Create an attestation
    Create {
        /// Subject (wallet or identity)
        subject: String,
        /// Compliance type (e.g., kyc, aml)
        compliance_type: String,
        /// Issuer
        issuer: String,
        /// Validity in days (config default when omitted)
        #[arg(long)]
        days: Option<u32>,
    },
    /// Verify an attestation
    Verify {
        /// Attestation ID
        attestation_id: String,
    },
    /// Revoke an attestation
    Revoke {
        /// Attestation ID
        attestation_id: String,
    },
    /// List attestations
    List {
        /// Filter by subject
        #[arg(long)]
        subject: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum DiscloseAction {
    /// Build an encrypted disclosure response
    Create {
        /// Disclosure request (JSON file)
        request: PathBuf,
        /// Full record to disclose from (JSON object file)
        data: PathBuf,
        /// Shared encryption key (hex, 32 bytes)
        #[arg(long)]
        key: String,
        /// Write the response to a file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Decrypt a disclosure response
    Open {
        /// Disclosure response (JSON file)
        response: PathBuf,
        /// Shared encryption key (hex, 32 bytes)
        #[arg(long)]
        key: String,
    },
    /// Generate a fresh shared key (hex)
    Keygen,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Balances,
    Transfers,
    Identity,
    Full,
}

impl ScopeArg {
    pub fn to_core_type(&self) -> AuditScope {
        match self {
            ScopeArg::Balances => AuditScope::Balances,
            ScopeArg::Transfers => AuditScope::Transfers,
            ScopeArg::Identity => AuditScope::Identity,
            ScopeArg::Full => AuditScope::Full,
        }
    }
}

fn parse_claim_type(s: &str) -> Result<ClaimType, String> {
    s.parse::<ClaimType>().map_err(|_| {
        let known: Vec<&str> = ClaimType::iter().map(|t| t.as_str()).collect();
        format!("unknown claim type '{}' (expected one of: {})", s, known.join(", "))
    })
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ComplianceConfig> {
    match path {
        Some(path) => ComplianceConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(ComplianceConfig::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = load_config(cli.config.as_deref())?;
    let mut client = ComplianceClient::open(&cli.data, config)
        .with_context(|| format!("opening data directory {}", cli.data.display()))?;
    tracing::debug!(data = %cli.data.display(), "compliance client ready");

    match cli.command {
        Commands::Key { action } => keys::handle(&mut client, action)?,
        Commands::Claim { action } => claims::handle(&mut client, action)?,
        Commands::Attest { action } => attest::handle(&mut client, action)?,
        Commands::Disclose { action } => disclose::handle(&mut client, action)?,
        Commands::Ledger { from, limit, json } => ledger::show(&client, from, limit, json)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_key_add() {
        let cli = Cli::try_parse_from([
            "veil",
            "--data",
            "/tmp/veil",
            "key",
            "add",
            "sec",
            "--scope",
            "transfers",
            "--jurisdictions",
            "US,EU",
        ])
        .unwrap();

        assert_eq!(cli.data, PathBuf::from("/tmp/veil"));
        match cli.command {
            Commands::Key {
                action:
                    KeyAction::Add {
                        authority,
                        scope,
                        jurisdictions,
                        expires_in_days,
                        ..
                    },
            } => {
                assert_eq!(authority, "sec");
                assert_eq!(scope.to_core_type(), AuditScope::Transfers);
                assert_eq!(jurisdictions, vec!["US", "EU"]);
                assert!(expires_in_days.is_none());
            }
            _ => panic!("expected key add"),
        }
    }

    #[test]
    fn test_cli_parses_claim_types() {
        let cli =
            Cli::try_parse_from(["veil", "claim", "prove", "age_over_18,kyc_verified"]).unwrap();

        match cli.command {
            Commands::Claim {
                action: ClaimAction::Prove { claim_types, .. },
            } => assert_eq!(
                claim_types,
                vec![ClaimType::AgeOver18, ClaimType::KycVerified]
            ),
            _ => panic!("expected claim prove"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_claim_type() {
        assert!(Cli::try_parse_from(["veil", "claim", "store", "age_over_99", "true"]).is_err());
    }

    #[test]
    fn test_load_config_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.proof_max_age_secs, 3600);
    }
}
