//! Error types for key loading and field-level encryption.

use thiserror::Error;

/// Errors that can occur while loading key material or transforming payloads.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key or certificate bytes were structurally invalid.
    #[error("malformed key material: {0}")]
    KeyFormat(String),

    /// The expected key material file does not exist.
    #[error("key material not found at {path}")]
    KeyNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// Reading key material failed for a reason other than absence.
    #[error("failed to read key material: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON path did not match the supported grammar.
    #[error("invalid JSON path `{path}`: {reason}")]
    InvalidPath {
        /// The offending path expression.
        path: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The configuration was incomplete or inconsistent.
    #[error("invalid encryption configuration: {0}")]
    InvalidConfig(String),

    /// Encryption was requested but no recipient certificate is configured.
    #[error("no encryption certificate configured")]
    MissingCertificate,

    /// Decryption was requested but no private key is configured.
    #[error("no decryption key configured")]
    MissingDecryptionKey,

    /// The recipient certificate's validity period has ended.
    #[error("encryption certificate expired")]
    CertificateExpired,

    /// Field encryption failed (symmetric cipher or RSA key wrap).
    #[error("field encryption failed: {0}")]
    Encryption(String),

    /// An encrypted field was not a well-formed envelope.
    #[error("malformed encrypted field at `{path}`: {reason}")]
    MalformedEnvelope {
        /// Path of the envelope in the document.
        path: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The envelope was produced for a different key pair.
    #[error("fingerprint mismatch: envelope carries {actual}, configured key is {expected}")]
    FingerprintMismatch {
        /// Fingerprint of the configured key material.
        expected: String,
        /// Fingerprint recorded in the envelope.
        actual: String,
    },

    /// Field decryption failed (key unwrap, authentication, or plaintext parse).
    #[error("field decryption failed: {0}")]
    Decryption(&'static str),

    /// Inserting a field would overwrite an existing sibling.
    #[error("path conflict at `{path}`: {reason}")]
    PathConflict {
        /// Target path of the insertion.
        path: String,
        /// Why the insertion was refused.
        reason: &'static str,
    },

    /// JSON serialization of a field value failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for cryptographic operations.
pub type CryptoResult<T> = Result<T, CryptoError>;
