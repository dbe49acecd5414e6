//! Veil Compliance Registry
//!
//! Bookkeeping for audit keys, KYC claims, compliance attestations and
//! selective disclosure.
//!
//! ## Not zero-knowledge
//!
//! The "proofs" produced here are SHA-256 commitments computed over the
//! plaintext claim values. They bind data, they do not hide it, and
//! verification is structural only. The KYC nullifier is salted with the
//! generation timestamp, so it changes on every call and cannot serve as a
//! replay guard. Both behaviours are kept for compatibility with the demo
//! front-end that consumes them.
//!
//! ## Architecture
//!
//! ```text
//!                ComplianceClient
//!        ┌──────────┬────┴─────┬─────────────┐
//!   AuditKeyRegistry  KycRegistry  AttestationRegistry  disclosure
//!        │              │              │
//!        └───── Store<V> (memory / JSON file) ─────┘
//!                       │
//!               ComplianceLedger (JSONL audit trail)
//! ```
//!
//! ## Key Components
//!
//! - [`context::ComplianceContext`] - Connection handle, clock and config
//! - [`store::Store`] - Pluggable persistence (`get/put/list`)
//! - [`audit_key::AuditKeyRegistry`] - Time-boxed decryption grants
//! - [`kyc::KycRegistry`] - Claim storage and hash-based proofs
//! - [`attestation::AttestationRegistry`] - Revocable compliance attestations
//! - [`disclosure`] - Field filtering and encryption for a requester
//! - [`ledger::ComplianceLedger`] - Append-only JSONL event log
//! - [`client::ComplianceClient`] - Composition root

pub mod attestation;
pub mod audit_key;
pub mod client;
pub mod config;
pub mod context;
pub mod disclosure;
pub mod error;
pub mod event;
pub mod kyc;
pub mod ledger;
pub mod store;

pub use attestation::{AttestationRegistry, ComplianceAttestation};
pub use audit_key::{AuditKey, AuditKeyConfig, AuditKeyRegistry, AuditScope, Expiry, KeyStatus};
pub use client::ComplianceClient;
pub use config::ComplianceConfig;
pub use context::ComplianceContext;
pub use disclosure::{DisclosureRequest, DisclosureResponse};
pub use error::{ComplianceError, ComplianceResult};
pub use event::ComplianceEvent;
pub use kyc::{ClaimType, ClaimValue, KycClaim, KycRegistry, ProofPublicInputs, ZkKycProof};
pub use ledger::ComplianceLedger;
pub use store::{JsonFileStore, MemoryStore, Store, StoreError};
