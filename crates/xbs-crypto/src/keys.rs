//! RSA private key and X.509 certificate loading.
//!
//! Key material is parsed once at process start and wrapped in types that
//! carry the SHA-256 fingerprints used to tag and validate encrypted-field
//! envelopes. The wrappers are immutable and cheap to share across requests.

use std::path::Path;
use std::time::SystemTime;

use rand::rngs::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::{Digest, Sha256, Sha512};
use x509_cert::der::{Decode, Encode};
use x509_cert::Certificate;
use zeroize::Zeroizing;

use crate::config::OaepDigest;
use crate::error::{CryptoError, CryptoResult};
use crate::pem::decode_key_material;

/// Load an unencrypted PKCS#8 RSA private key from PEM text or raw DER.
///
/// # Errors
///
/// Returns [`CryptoError::KeyFormat`] on malformed base64 or structurally
/// invalid key bytes.
pub fn load_private_key(bytes: &[u8]) -> CryptoResult<RsaPrivateKey> {
    let der = decode_key_material(bytes)?;
    RsaPrivateKey::from_pkcs8_der(&der).map_err(|e| {
        CryptoError::KeyFormat(format!("not an unencrypted PKCS#8 RSA private key: {e}"))
    })
}

/// Load an X.509 certificate from PEM text or raw DER.
///
/// # Errors
///
/// Returns [`CryptoError::KeyFormat`] on malformed base64, invalid
/// certificate structure, or a non-RSA subject key.
pub fn load_certificate(bytes: &[u8]) -> CryptoResult<EncryptionCertificate> {
    let der = decode_key_material(bytes)?;
    EncryptionCertificate::from_der(&der)
}

/// Read key material from disk.
///
/// # Errors
///
/// Maps an absent file to [`CryptoError::KeyNotFound`]; other IO failures
/// surface as [`CryptoError::Io`].
pub fn read_key_material(path: impl AsRef<Path>) -> CryptoResult<Vec<u8>> {
    let path = path.as_ref();
    std::fs::read(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CryptoError::KeyNotFound {
                path: path.display().to_string(),
            }
        } else {
            CryptoError::Io(e)
        }
    })
}

/// Private key used to unwrap symmetric keys from response envelopes.
///
/// Carries the SHA-256 fingerprint of the corresponding public key so
/// envelopes can be checked against the configured key pair before any
/// unwrap is attempted.
#[derive(Clone)]
pub struct DecryptionKey {
    key: RsaPrivateKey,
    key_fingerprint: String,
}

impl DecryptionKey {
    /// Load from PEM text or raw PKCS#8 DER.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyFormat`] on invalid key material.
    pub fn from_pem(bytes: &[u8]) -> CryptoResult<Self> {
        Self::from_private_key(load_private_key(bytes)?)
    }

    /// Wrap an already-parsed RSA private key.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyFormat`] if the public half cannot be
    /// re-encoded for fingerprinting.
    pub fn from_private_key(key: RsaPrivateKey) -> CryptoResult<Self> {
        let spki = key
            .to_public_key()
            .to_public_key_der()
            .map_err(|e| CryptoError::KeyFormat(format!("failed to encode public key: {e}")))?;
        Ok(Self {
            key_fingerprint: sha256_hex(spki.as_bytes()),
            key,
        })
    }

    /// Hex-encoded SHA-256 fingerprint of the corresponding public key.
    #[must_use]
    pub fn key_fingerprint(&self) -> &str {
        &self.key_fingerprint
    }

    /// Unwrap an RSA-OAEP-wrapped symmetric key.
    pub(crate) fn unwrap_key(
        &self,
        digest: OaepDigest,
        wrapped: &[u8],
    ) -> CryptoResult<Zeroizing<Vec<u8>>> {
        let padding = match digest {
            OaepDigest::Sha256 => Oaep::new::<Sha256>(),
            OaepDigest::Sha512 => Oaep::new::<Sha512>(),
        };
        self.key
            .decrypt(padding, wrapped)
            .map(Zeroizing::new)
            .map_err(|_| CryptoError::Decryption("failed to unwrap symmetric key"))
    }
}

impl std::fmt::Debug for DecryptionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionKey")
            .field("key_fingerprint", &self.key_fingerprint)
            .finish_non_exhaustive()
    }
}

/// Recipient certificate used to wrap symmetric keys for outbound payloads.
#[derive(Clone)]
pub struct EncryptionCertificate {
    public_key: RsaPublicKey,
    certificate_fingerprint: String,
    key_fingerprint: String,
    not_after: SystemTime,
}

impl EncryptionCertificate {
    /// Parse an X.509 certificate from DER bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::KeyFormat`] on invalid certificate structure
    /// or a subject key that is not RSA.
    pub fn from_der(der: &[u8]) -> CryptoResult<Self> {
        let certificate = Certificate::from_der(der)
            .map_err(|e| CryptoError::KeyFormat(format!("not a valid X.509 certificate: {e}")))?;
        let spki_der = certificate
            .tbs_certificate
            .subject_public_key_info
            .to_der()
            .map_err(|e| CryptoError::KeyFormat(format!("failed to encode subject key: {e}")))?;
        let public_key = RsaPublicKey::from_public_key_der(&spki_der).map_err(|e| {
            CryptoError::KeyFormat(format!("certificate subject key is not RSA: {e}"))
        })?;
        let not_after = certificate
            .tbs_certificate
            .validity
            .not_after
            .to_system_time();

        Ok(Self {
            public_key,
            certificate_fingerprint: sha256_hex(der),
            key_fingerprint: sha256_hex(&spki_der),
            not_after,
        })
    }

    /// Hex-encoded SHA-256 fingerprint of the full certificate DER.
    #[must_use]
    pub fn certificate_fingerprint(&self) -> &str {
        &self.certificate_fingerprint
    }

    /// Hex-encoded SHA-256 fingerprint of the subject public key DER.
    #[must_use]
    pub fn key_fingerprint(&self) -> &str {
        &self.key_fingerprint
    }

    /// End of the certificate's validity period.
    #[must_use]
    pub fn not_after(&self) -> SystemTime {
        self.not_after
    }

    /// Whether the certificate has expired at `now`.
    #[must_use]
    pub fn is_expired(&self, now: SystemTime) -> bool {
        now > self.not_after
    }

    /// Wrap a symmetric key under the subject public key with RSA-OAEP.
    pub(crate) fn wrap_key(&self, digest: OaepDigest, key: &[u8]) -> CryptoResult<Vec<u8>> {
        let padding = match digest {
            OaepDigest::Sha256 => Oaep::new::<Sha256>(),
            OaepDigest::Sha512 => Oaep::new::<Sha512>(),
        };
        let mut rng = OsRng;
        self.public_key
            .encrypt(&mut rng, padding, key)
            .map_err(|e| CryptoError::Encryption(format!("failed to wrap symmetric key: {e}")))
    }
}

impl std::fmt::Debug for EncryptionCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptionCertificate")
            .field("certificate_fingerprint", &self.certificate_fingerprint)
            .field("key_fingerprint", &self.key_fingerprint)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/key_pkcs8.pem");
    const CERT_PEM: &[u8] = include_bytes!("../tests/fixtures/cert.pem");
    const OTHER_KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/other_key_pkcs8.pem");

    #[test]
    fn loads_private_key() {
        use rsa::traits::PublicKeyParts;

        let key = load_private_key(KEY_PEM).unwrap();
        assert_eq!(key.size(), 256); // 2048-bit modulus
    }

    #[test]
    fn loads_certificate_with_fingerprints() {
        let cert = load_certificate(CERT_PEM).unwrap();
        assert_eq!(cert.certificate_fingerprint().len(), 64);
        assert_eq!(cert.key_fingerprint().len(), 64);
        assert_ne!(cert.certificate_fingerprint(), cert.key_fingerprint());
        assert!(!cert.is_expired(SystemTime::now()));
    }

    #[test]
    fn certificate_and_matching_key_share_key_fingerprint() {
        let cert = load_certificate(CERT_PEM).unwrap();
        let key = DecryptionKey::from_pem(KEY_PEM).unwrap();
        assert_eq!(cert.key_fingerprint(), key.key_fingerprint());
    }

    #[test]
    fn unrelated_key_has_different_fingerprint() {
        let cert = load_certificate(CERT_PEM).unwrap();
        let other = DecryptionKey::from_pem(OTHER_KEY_PEM).unwrap();
        assert_ne!(cert.key_fingerprint(), other.key_fingerprint());
    }

    #[test]
    fn rejects_garbage_private_key() {
        let err = load_private_key(b"not a key").unwrap_err();
        assert!(matches!(err, CryptoError::KeyFormat(_)));
    }

    #[test]
    fn rejects_key_bytes_as_certificate() {
        let err = load_certificate(KEY_PEM).unwrap_err();
        assert!(matches!(err, CryptoError::KeyFormat(_)));
    }

    #[test]
    fn missing_file_maps_to_key_not_found() {
        let err = read_key_material("/nonexistent/signing_key.pem").unwrap_err();
        assert!(matches!(err, CryptoError::KeyNotFound { .. }));
    }

    #[test]
    fn debug_output_omits_key_material() {
        let key = DecryptionKey::from_pem(KEY_PEM).unwrap();
        let rendered = format!("{key:?}");
        assert!(rendered.contains("key_fingerprint"));
        assert!(!rendered.contains("modulus"));
    }
}
