//! Random opaque identifiers

use rand::rngs::OsRng;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Fill an `N`-byte array from the OS random source
pub fn random_bytes<const N: usize>() -> CryptoResult<[u8; N]> {
    let mut buf = [0u8; N];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| CryptoError::Random(e.to_string()))?;
    Ok(buf)
}

/// Random identifier of `N` bytes, hex encoded (2N characters)
pub fn random_id<const N: usize>() -> CryptoResult<String> {
    Ok(hex::encode(random_bytes::<N>()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_id_length() {
        let id = random_id::<16>().unwrap();
        assert_eq!(id.len(), 32);
    }

    #[test]
    fn test_random_ids_differ() {
        let a = random_id::<16>().unwrap();
        let b = random_id::<16>().unwrap();
        assert_ne!(a, b);
    }
}
