//! Integration tests for veil-core primitives

use chrono::{Duration, TimeZone, Utc};
use veil_core::{
    decrypt, encrypt, generate_key, key_from_hex, random_id, sha256_hex, Clock, CryptoError,
    ManualClock, SystemClock, NONCE_SIZE, TAG_SIZE,
};

#[test]
fn test_hex_key_round_trip_through_cipher() {
    let key = generate_key().unwrap();
    let parsed = key_from_hex(&hex::encode(key)).unwrap();

    let ct = encrypt(&key, b"balance:1200").unwrap();
    assert_eq!(ct.len(), NONCE_SIZE + "balance:1200".len() + TAG_SIZE);
    assert_eq!(decrypt(&parsed, &ct).unwrap(), b"balance:1200");
}

#[test]
fn test_truncated_ciphertext_rejected() {
    let key = generate_key().unwrap();
    let ct = encrypt(&key, b"").unwrap();

    let err = decrypt(&key, &ct[..ct.len() - 1]).unwrap_err();
    assert!(matches!(err, CryptoError::InvalidCiphertext { .. }));
}

#[test]
fn test_digests_are_lowercase_hex() {
    let digest = sha256_hex("veil");
    assert_eq!(digest.len(), 64);
    assert!(digest.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
}

#[test]
fn test_random_ids_are_distinct() {
    let a = random_id::<16>().unwrap();
    let b = random_id::<16>().unwrap();
    assert_eq!(a.len(), 32);
    assert_ne!(a, b);
}

#[test]
fn test_clocks_report_milliseconds() {
    let start = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start + Duration::microseconds(1_500));
    assert_eq!(clock.now(), start + Duration::milliseconds(1));

    clock.advance(Duration::days(1));
    assert_eq!(clock.now(), start + Duration::days(1) + Duration::milliseconds(1));

    assert_eq!(SystemClock.now().timestamp_subsec_nanos() % 1_000_000, 0);
}
