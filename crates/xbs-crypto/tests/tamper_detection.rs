//! Adversarial tests: corrupted envelopes and wrong key pairs must fail
//! closed, never yield altered plaintext.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde_json::{json, Value};
use xbs_crypto::{
    decrypt_payload, encrypt_payload, load_certificate, CryptoError, DecryptionKey,
    FieldLevelEncryptionConfig,
};

const KEY_PEM: &[u8] = include_bytes!("fixtures/key_pkcs8.pem");
const CERT_PEM: &[u8] = include_bytes!("fixtures/cert.pem");
const OTHER_KEY_PEM: &[u8] = include_bytes!("fixtures/other_key_pkcs8.pem");

fn config_with_key(key_pem: &[u8]) -> FieldLevelEncryptionConfig {
    FieldLevelEncryptionConfig::builder()
        .with_encryption_certificate(load_certificate(CERT_PEM).unwrap())
        .with_decryption_key(DecryptionKey::from_pem(key_pem).unwrap())
        .with_encryption_path("$.transferAmount", "$.encryptedPayload")
        .with_decryption_path("$.encryptedPayload", "$.transferAmount")
        .build()
        .unwrap()
}

fn payload() -> Value {
    json!({
        "transferAmount": {"currency": "USD", "amount": "100.00"},
        "senderAccountUri": "urn:x:1",
    })
}

/// Flip one byte inside a base64-encoded envelope field.
fn corrupt_field(document: &mut Value, field: &str) {
    let encoded = document["encryptedPayload"][field].as_str().unwrap();
    let mut bytes = STANDARD.decode(encoded).unwrap();
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0x01;
    document["encryptedPayload"][field] = json!(STANDARD.encode(bytes));
}

#[test]
fn tampered_ciphertext_fails_closed() {
    let config = config_with_key(KEY_PEM);
    let mut encrypted = encrypt_payload(&payload(), &config).unwrap();
    corrupt_field(&mut encrypted, "encryptedValue");

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)), "{err}");
}

#[test]
fn tampered_wrapped_key_fails_closed() {
    let config = config_with_key(KEY_PEM);
    let mut encrypted = encrypt_payload(&payload(), &config).unwrap();
    corrupt_field(&mut encrypted, "encryptedKey");

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)), "{err}");
}

#[test]
fn tampered_iv_fails_closed() {
    let config = config_with_key(KEY_PEM);
    let mut encrypted = encrypt_payload(&payload(), &config).unwrap();
    corrupt_field(&mut encrypted, "iv");

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)), "{err}");
}

#[test]
fn every_ciphertext_byte_is_authenticated() {
    let config = config_with_key(KEY_PEM);
    let encrypted = encrypt_payload(&payload(), &config).unwrap();
    let encoded = encrypted["encryptedPayload"]["encryptedValue"]
        .as_str()
        .unwrap();
    let original = STANDARD.decode(encoded).unwrap();

    for index in 0..original.len() {
        let mut bytes = original.clone();
        bytes[index] ^= 0xff;
        let mut mutated = encrypted.clone();
        mutated["encryptedPayload"]["encryptedValue"] = json!(STANDARD.encode(&bytes));

        let err = decrypt_payload(&mutated, &config).unwrap_err();
        assert!(
            matches!(err, CryptoError::Decryption(_)),
            "byte {index} survived tampering"
        );
    }
}

#[test]
fn wrong_key_is_rejected_by_fingerprint() {
    let sender = config_with_key(KEY_PEM);
    let encrypted = encrypt_payload(&payload(), &sender).unwrap();

    // Same certificate configured, but an unrelated private key.
    let wrong_key = FieldLevelEncryptionConfig::builder()
        .with_decryption_key(DecryptionKey::from_pem(OTHER_KEY_PEM).unwrap())
        .with_decryption_path("$.encryptedPayload", "$.transferAmount")
        .build()
        .unwrap();

    let err = decrypt_payload(&encrypted, &wrong_key).unwrap_err();
    assert!(matches!(err, CryptoError::FingerprintMismatch { .. }), "{err}");
}

#[test]
fn forged_fingerprint_still_fails_at_unwrap() {
    // An attacker who rewrites the fingerprint to match the victim's key
    // still cannot get past the OAEP unwrap.
    let sender = config_with_key(KEY_PEM);
    let mut encrypted = encrypt_payload(&payload(), &sender).unwrap();

    let wrong_key = FieldLevelEncryptionConfig::builder()
        .with_decryption_key(DecryptionKey::from_pem(OTHER_KEY_PEM).unwrap())
        .with_decryption_path("$.encryptedPayload", "$.transferAmount")
        .build()
        .unwrap();
    let forged = wrong_key.decryption_key().unwrap().key_fingerprint();
    encrypted["encryptedPayload"]["encryptionKeyFingerprint"] = json!(forged);

    let err = decrypt_payload(&encrypted, &wrong_key).unwrap_err();
    assert!(matches!(err, CryptoError::Decryption(_)), "{err}");
}

#[test]
fn incomplete_envelope_is_rejected() {
    let config = config_with_key(KEY_PEM);
    let mut encrypted = encrypt_payload(&payload(), &config).unwrap();
    encrypted["encryptedPayload"]
        .as_object_mut()
        .unwrap()
        .remove("encryptedKey");

    let err = decrypt_payload(&encrypted, &config).unwrap_err();
    assert!(matches!(err, CryptoError::MalformedEnvelope { .. }), "{err}");
}
