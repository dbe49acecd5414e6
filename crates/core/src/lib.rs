//! Veil Core - shared primitives
//!
//! This crate contains the building blocks used by the compliance registry:
//! - `hash`: SHA-256 helpers producing lowercase hex digests
//! - `cipher`: AES-256-GCM encryption with a random nonce prefix
//! - `clock`: Injectable time source (system or manual)
//! - `id`: Random opaque identifiers

pub mod cipher;
pub mod clock;
pub mod error;
pub mod hash;
pub mod id;

pub use cipher::{
    decrypt, encrypt, generate_key, key_from_hex, EncryptionKey, KEY_SIZE, NONCE_SIZE, TAG_SIZE,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CryptoError, CryptoResult};
pub use hash::{sha256, sha256_hex};
pub use id::{random_bytes, random_id};
