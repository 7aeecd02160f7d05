//! Field-level payload encryption for the cross-border payments gateway.
//!
//! This crate provides the cryptographic core shared by the gateway: loading
//! key material from PEM byte streams, and selectively encrypting/decrypting
//! individual JSON fields of a payload using a hybrid RSA/AES construction.
//!
//! Each selected field is replaced by a structured envelope carrying the
//! AES-256-GCM ciphertext, the RSA-OAEP-wrapped symmetric key, the nonce, and
//! SHA-256 fingerprints identifying the recipient certificate and key. Which
//! fields are touched is driven by an ordered list of JSON-path rules held in
//! an immutable [`FieldLevelEncryptionConfig`].
//!
//! # Modules
//!
//! - [`pem`] - PEM body extraction and DER decoding
//! - [`keys`] - RSA private key and X.509 certificate loading
//! - [`path`] - dotted JSON path resolution over `serde_json::Value`
//! - [`config`] - the immutable encryption configuration and its builder
//! - [`envelope`] - the encrypted-field envelope representation
//! - [`field_level`] - the encrypt/decrypt engine itself
//!
//! # Example
//!
//! ```rust,ignore
//! use xbs_crypto::{
//!     encrypt_payload, decrypt_payload, load_certificate, DecryptionKey,
//!     FieldLevelEncryptionConfig,
//! };
//!
//! let certificate = load_certificate(cert_pem)?;
//! let key = DecryptionKey::from_pem(key_pem)?;
//!
//! let config = FieldLevelEncryptionConfig::builder()
//!     .with_encryption_certificate(certificate)
//!     .with_decryption_key(key)
//!     .with_encryption_path("$.transferAmount", "$.encryptedPayload")
//!     .with_decryption_path("$.encryptedPayload", "$.transferAmount")
//!     .build()?;
//!
//! let encrypted = encrypt_payload(&payload, &config)?;
//! let restored = decrypt_payload(&encrypted, &config)?;
//! assert_eq!(restored, payload);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod envelope;
pub mod error;
pub mod field_level;
pub mod keys;
pub mod path;
pub mod pem;

// Re-export commonly used types at crate root
pub use config::{
    FieldLevelEncryptionConfig, FieldLevelEncryptionConfigBuilder, FieldRule, FieldValueEncoding,
    OaepDigest,
};
pub use envelope::FieldEnvelope;
pub use error::{CryptoError, CryptoResult};
pub use field_level::{decrypt_payload, encrypt_payload};
pub use keys::{
    load_certificate, load_private_key, read_key_material, DecryptionKey, EncryptionCertificate,
};
pub use path::FieldPath;
pub use pem::pem_to_der;
