//! The field-level encryption engine.
//!
//! Hybrid construction: every selected field gets a fresh random AES-256 key
//! and nonce; the field value is encrypted with AES-256-GCM and the
//! symmetric key is wrapped under the recipient's RSA public key with OAEP.
//! This bounds RSA operations to a small fixed-size payload regardless of
//! field size, and lets multiple fields of one document carry independent
//! symmetric keys while sharing one certificate.
//!
//! Both operations are copy-on-write: the caller's document is never
//! mutated, a transformed copy is returned.

use std::time::SystemTime;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand::rngs::OsRng;
use rand::RngCore;
use serde_json::Value;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::config::FieldLevelEncryptionConfig;
use crate::envelope::FieldEnvelope;
use crate::error::{CryptoError, CryptoResult};
use crate::keys::{DecryptionKey, EncryptionCertificate};

/// AES-256 key size in bytes.
pub const AES_KEY_SIZE: usize = 32;

/// AES-GCM nonce size (96 bits / 12 bytes).
pub const GCM_NONCE_SIZE: usize = 12;

/// Encrypt the configured fields of a payload.
///
/// Rules are applied in declaration order. A rule whose source path is
/// absent from the document is skipped; absence of an optional field is not
/// an error.
///
/// # Errors
///
/// Fails with [`CryptoError::MissingCertificate`] /
/// [`CryptoError::CertificateExpired`] when no usable recipient certificate
/// is configured, [`CryptoError::Encryption`] on a cipher or key-wrap
/// failure, and [`CryptoError::PathConflict`] when a target field already
/// exists.
pub fn encrypt_payload(
    payload: &Value,
    config: &FieldLevelEncryptionConfig,
) -> CryptoResult<Value> {
    let certificate = config
        .encryption_certificate
        .as_ref()
        .ok_or(CryptoError::MissingCertificate)?;
    if certificate.is_expired(SystemTime::now()) {
        return Err(CryptoError::CertificateExpired);
    }

    let mut document = payload.clone();
    for rule in &config.encryption_rules {
        let Some(value) = rule.source.remove(&mut document) else {
            continue;
        };
        let plaintext = serde_json::to_string(&value)?;
        let envelope = seal_field(plaintext.as_bytes(), certificate, config)?;
        rule.target.insert(&mut document, envelope.to_value(config))?;
    }
    Ok(document)
}

/// Decrypt the configured fields of a payload.
///
/// A rule whose source path is absent is skipped. Each present envelope is
/// validated against the configured key pair's fingerprints before any
/// unwrap is attempted, so a wrong key fails loudly rather than producing
/// garbage.
///
/// # Errors
///
/// Fails with [`CryptoError::MissingDecryptionKey`] when no private key is
/// configured, [`CryptoError::MalformedEnvelope`] on a structurally invalid
/// envelope, [`CryptoError::FingerprintMismatch`] when the envelope was
/// produced for a different key pair, and [`CryptoError::Decryption`] on any
/// cryptographic failure — never a partial or altered plaintext.
pub fn decrypt_payload(
    payload: &Value,
    config: &FieldLevelEncryptionConfig,
) -> CryptoResult<Value> {
    let key = config
        .decryption_key
        .as_ref()
        .ok_or(CryptoError::MissingDecryptionKey)?;

    let mut document = payload.clone();
    for rule in &config.decryption_rules {
        let Some(raw) = rule.source.resolve(&document) else {
            continue;
        };
        let envelope = FieldEnvelope::from_value(raw, config, &rule.source)?;
        enforce_fingerprints(&envelope, key, config)?;
        let value = open_field(&envelope, key, config)?;
        rule.source.remove(&mut document);
        rule.target.insert(&mut document, value)?;
    }
    Ok(document)
}

fn enforce_fingerprints(
    envelope: &FieldEnvelope,
    key: &DecryptionKey,
    config: &FieldLevelEncryptionConfig,
) -> CryptoResult<()> {
    let key_matches: bool = envelope
        .key_fingerprint
        .as_bytes()
        .ct_eq(key.key_fingerprint().as_bytes())
        .into();
    if !key_matches {
        return Err(CryptoError::FingerprintMismatch {
            expected: key.key_fingerprint().to_string(),
            actual: envelope.key_fingerprint.clone(),
        });
    }

    if let Some(certificate) = &config.encryption_certificate {
        let certificate_matches: bool = envelope
            .certificate_fingerprint
            .as_bytes()
            .ct_eq(certificate.certificate_fingerprint().as_bytes())
            .into();
        if !certificate_matches {
            return Err(CryptoError::FingerprintMismatch {
                expected: certificate.certificate_fingerprint().to_string(),
                actual: envelope.certificate_fingerprint.clone(),
            });
        }
    }
    Ok(())
}

fn seal_field(
    plaintext: &[u8],
    certificate: &EncryptionCertificate,
    config: &FieldLevelEncryptionConfig,
) -> CryptoResult<FieldEnvelope> {
    let mut key_bytes = Zeroizing::new([0u8; AES_KEY_SIZE]);
    OsRng.fill_bytes(key_bytes.as_mut_slice());
    let mut iv = [0u8; GCM_NONCE_SIZE];
    OsRng.fill_bytes(&mut iv);

    let cipher = Aes256Gcm::new_from_slice(key_bytes.as_slice())
        .map_err(|_| CryptoError::Encryption("invalid symmetric key length".into()))?;
    let encrypted_value = cipher
        .encrypt(Nonce::from_slice(&iv), plaintext)
        .map_err(|_| CryptoError::Encryption("symmetric cipher failure".into()))?;
    let encrypted_key = certificate.wrap_key(config.oaep_digest, key_bytes.as_slice())?;

    Ok(FieldEnvelope {
        encrypted_value,
        encrypted_key,
        iv: iv.to_vec(),
        certificate_fingerprint: certificate.certificate_fingerprint().to_string(),
        key_fingerprint: certificate.key_fingerprint().to_string(),
    })
}

fn open_field(
    envelope: &FieldEnvelope,
    key: &DecryptionKey,
    config: &FieldLevelEncryptionConfig,
) -> CryptoResult<Value> {
    let key_bytes = key.unwrap_key(config.oaep_digest, &envelope.encrypted_key)?;
    if envelope.iv.len() != GCM_NONCE_SIZE {
        return Err(CryptoError::Decryption("invalid nonce length"));
    }
    let cipher = Aes256Gcm::new_from_slice(&key_bytes)
        .map_err(|_| CryptoError::Decryption("invalid symmetric key length"))?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(&envelope.iv), envelope.encrypted_value.as_slice())
        .map_err(|_| CryptoError::Decryption("ciphertext authentication failed"))?;
    let text = std::str::from_utf8(&plaintext)
        .map_err(|_| CryptoError::Decryption("plaintext is not valid UTF-8"))?;
    serde_json::from_str(text).map_err(|_| CryptoError::Decryption("plaintext is not valid JSON"))
}
