//! Symmetric encryption (AES-256-GCM)
//!
//! Output layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! A fresh random nonce is drawn for every call, so encrypting the same
//! plaintext twice yields different bytes.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use crate::error::{CryptoError, CryptoResult};
use crate::id::random_bytes;

/// Key size for AES-256
pub const KEY_SIZE: usize = 32;

/// Nonce size for AES-GCM
pub const NONCE_SIZE: usize = 12;

/// Authentication tag size
pub const TAG_SIZE: usize = 16;

/// Symmetric encryption key
pub type EncryptionKey = [u8; KEY_SIZE];

/// Generate a new random encryption key
pub fn generate_key() -> CryptoResult<EncryptionKey> {
    random_bytes::<KEY_SIZE>()
}

/// Parse a hex-encoded 32-byte key
pub fn key_from_hex(s: &str) -> CryptoResult<EncryptionKey> {
    let bytes = hex::decode(s.trim()).map_err(|e| CryptoError::InvalidHex(e.to_string()))?;
    let actual = bytes.len();
    bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
        expected: KEY_SIZE,
        actual,
    })
}

/// Encrypt `plaintext` under `key`
pub fn encrypt(key: &EncryptionKey, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let nonce_bytes = random_bytes::<NONCE_SIZE>()?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);

    Ok(result)
}

/// Decrypt bytes produced by [`encrypt`]
pub fn decrypt(key: &EncryptionKey, data: &[u8]) -> CryptoResult<Vec<u8>> {
    if data.len() < NONCE_SIZE + TAG_SIZE {
        return Err(CryptoError::InvalidCiphertext {
            len: data.len(),
            min: NONCE_SIZE + TAG_SIZE,
        });
    }

    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))?;

    let nonce = Nonce::from_slice(&data[..NONCE_SIZE]);

    cipher
        .decrypt(nonce, &data[NONCE_SIZE..])
        .map_err(|e| CryptoError::DecryptionFailed(e.to_string()))
}
