//! The immutable field-level encryption configuration.
//!
//! Built once at process start from loaded key material and shared by all
//! requests. The builder mirrors the counterparty's configuration contract:
//! envelope field names and value encoding are configuration agreed out of
//! band, not protocol negotiation.

use crate::error::{CryptoError, CryptoResult};
use crate::keys::{DecryptionKey, EncryptionCertificate};
use crate::path::FieldPath;

/// Default envelope field name for the ciphertext.
pub const DEFAULT_ENCRYPTED_VALUE_FIELD: &str = "encryptedValue";
/// Default envelope field name for the wrapped symmetric key.
pub const DEFAULT_ENCRYPTED_KEY_FIELD: &str = "encryptedKey";
/// Default envelope field name for the initialization vector.
pub const DEFAULT_IV_FIELD: &str = "iv";
/// Default envelope field name for the certificate fingerprint.
pub const DEFAULT_CERTIFICATE_FINGERPRINT_FIELD: &str = "encryptionCertificateFingerprint";
/// Default envelope field name for the public key fingerprint.
pub const DEFAULT_KEY_FINGERPRINT_FIELD: &str = "encryptionKeyFingerprint";

/// Digest algorithm used for RSA-OAEP padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OaepDigest {
    /// OAEP with SHA-256.
    Sha256,
    /// OAEP with SHA-512.
    Sha512,
}

impl OaepDigest {
    /// Parse a digest algorithm name as it appears in configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidConfig`] for unsupported algorithms.
    pub fn from_name(name: &str) -> CryptoResult<Self> {
        match name {
            "SHA-256" | "SHA256" => Ok(Self::Sha256),
            "SHA-512" | "SHA512" => Ok(Self::Sha512),
            other => Err(CryptoError::InvalidConfig(format!(
                "unsupported OAEP digest algorithm: {other}"
            ))),
        }
    }

    /// Canonical algorithm name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Sha256 => "SHA-256",
            Self::Sha512 => "SHA-512",
        }
    }
}

/// Encoding applied to binary envelope values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldValueEncoding {
    /// Standard base64.
    #[default]
    Base64,
    /// Lowercase hexadecimal.
    Hex,
}

impl FieldValueEncoding {
    /// Encode bytes for embedding in an envelope.
    #[must_use]
    pub fn encode(&self, bytes: &[u8]) -> String {
        use base64::{engine::general_purpose::STANDARD, Engine};
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Decode an envelope value; `None` on invalid input.
    #[must_use]
    pub fn decode(&self, value: &str) -> Option<Vec<u8>> {
        use base64::{engine::general_purpose::STANDARD, Engine};
        match self {
            Self::Base64 => STANDARD.decode(value).ok(),
            Self::Hex => hex::decode(value).ok(),
        }
    }
}

/// One (source path, target path) rewrite rule.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Path of the field to read.
    pub source: FieldPath,
    /// Path where the rewritten field is inserted.
    pub target: FieldPath,
}

/// Immutable configuration driving field-level encryption and decryption.
///
/// Constructed once via [`FieldLevelEncryptionConfig::builder`], then shared
/// read-only across threads for the process lifetime.
#[derive(Debug, Clone)]
pub struct FieldLevelEncryptionConfig {
    pub(crate) encryption_certificate: Option<EncryptionCertificate>,
    pub(crate) decryption_key: Option<DecryptionKey>,
    pub(crate) oaep_digest: OaepDigest,
    pub(crate) encrypted_value_field: String,
    pub(crate) encrypted_key_field: String,
    pub(crate) iv_field: String,
    pub(crate) certificate_fingerprint_field: String,
    pub(crate) key_fingerprint_field: String,
    pub(crate) value_encoding: FieldValueEncoding,
    pub(crate) encryption_rules: Vec<FieldRule>,
    pub(crate) decryption_rules: Vec<FieldRule>,
}

impl FieldLevelEncryptionConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> FieldLevelEncryptionConfigBuilder {
        FieldLevelEncryptionConfigBuilder::default()
    }

    /// The configured recipient certificate, if any.
    #[must_use]
    pub fn encryption_certificate(&self) -> Option<&EncryptionCertificate> {
        self.encryption_certificate.as_ref()
    }

    /// The configured decryption key, if any.
    #[must_use]
    pub fn decryption_key(&self) -> Option<&DecryptionKey> {
        self.decryption_key.as_ref()
    }

    /// The configured OAEP digest.
    #[must_use]
    pub const fn oaep_digest(&self) -> OaepDigest {
        self.oaep_digest
    }

    /// Encryption rules in declaration order.
    #[must_use]
    pub fn encryption_rules(&self) -> &[FieldRule] {
        &self.encryption_rules
    }

    /// Decryption rules in declaration order.
    #[must_use]
    pub fn decryption_rules(&self) -> &[FieldRule] {
        &self.decryption_rules
    }
}

/// Builder for [`FieldLevelEncryptionConfig`].
#[derive(Debug, Default)]
pub struct FieldLevelEncryptionConfigBuilder {
    encryption_certificate: Option<EncryptionCertificate>,
    decryption_key: Option<DecryptionKey>,
    oaep_digest: Option<OaepDigest>,
    encrypted_value_field: Option<String>,
    encrypted_key_field: Option<String>,
    iv_field: Option<String>,
    certificate_fingerprint_field: Option<String>,
    key_fingerprint_field: Option<String>,
    value_encoding: FieldValueEncoding,
    encryption_paths: Vec<(String, String)>,
    decryption_paths: Vec<(String, String)>,
}

impl FieldLevelEncryptionConfigBuilder {
    /// Set the recipient certificate used to wrap symmetric keys.
    #[must_use]
    pub fn with_encryption_certificate(mut self, certificate: EncryptionCertificate) -> Self {
        self.encryption_certificate = Some(certificate);
        self
    }

    /// Set the private key used to decrypt response envelopes.
    #[must_use]
    pub fn with_decryption_key(mut self, key: DecryptionKey) -> Self {
        self.decryption_key = Some(key);
        self
    }

    /// Set the OAEP padding digest. Defaults to SHA-512.
    #[must_use]
    pub const fn with_oaep_digest(mut self, digest: OaepDigest) -> Self {
        self.oaep_digest = Some(digest);
        self
    }

    /// Override the ciphertext field name.
    #[must_use]
    pub fn with_encrypted_value_field_name(mut self, name: impl Into<String>) -> Self {
        self.encrypted_value_field = Some(name.into());
        self
    }

    /// Override the wrapped-key field name.
    #[must_use]
    pub fn with_encrypted_key_field_name(mut self, name: impl Into<String>) -> Self {
        self.encrypted_key_field = Some(name.into());
        self
    }

    /// Override the IV field name.
    #[must_use]
    pub fn with_iv_field_name(mut self, name: impl Into<String>) -> Self {
        self.iv_field = Some(name.into());
        self
    }

    /// Override the certificate fingerprint field name.
    #[must_use]
    pub fn with_encryption_certificate_fingerprint_field_name(
        mut self,
        name: impl Into<String>,
    ) -> Self {
        self.certificate_fingerprint_field = Some(name.into());
        self
    }

    /// Override the key fingerprint field name.
    #[must_use]
    pub fn with_encryption_key_fingerprint_field_name(mut self, name: impl Into<String>) -> Self {
        self.key_fingerprint_field = Some(name.into());
        self
    }

    /// Set the envelope value encoding. Defaults to base64.
    #[must_use]
    pub const fn with_field_value_encoding(mut self, encoding: FieldValueEncoding) -> Self {
        self.value_encoding = encoding;
        self
    }

    /// Append an encryption rule.
    #[must_use]
    pub fn with_encryption_path(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.encryption_paths.push((source.into(), target.into()));
        self
    }

    /// Append a decryption rule.
    #[must_use]
    pub fn with_decryption_path(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.decryption_paths.push((source.into(), target.into()));
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidConfig`] when neither a certificate nor
    /// a decryption key is present, and [`CryptoError::InvalidPath`] when a
    /// rule path does not parse.
    pub fn build(self) -> CryptoResult<FieldLevelEncryptionConfig> {
        if self.encryption_certificate.is_none() && self.decryption_key.is_none() {
            return Err(CryptoError::InvalidConfig(
                "at least one of encryption certificate or decryption key is required".into(),
            ));
        }

        let encryption_rules = parse_rules(&self.encryption_paths)?;
        let decryption_rules = parse_rules(&self.decryption_paths)?;

        Ok(FieldLevelEncryptionConfig {
            encryption_certificate: self.encryption_certificate,
            decryption_key: self.decryption_key,
            oaep_digest: self.oaep_digest.unwrap_or(OaepDigest::Sha512),
            encrypted_value_field: self
                .encrypted_value_field
                .unwrap_or_else(|| DEFAULT_ENCRYPTED_VALUE_FIELD.into()),
            encrypted_key_field: self
                .encrypted_key_field
                .unwrap_or_else(|| DEFAULT_ENCRYPTED_KEY_FIELD.into()),
            iv_field: self.iv_field.unwrap_or_else(|| DEFAULT_IV_FIELD.into()),
            certificate_fingerprint_field: self
                .certificate_fingerprint_field
                .unwrap_or_else(|| DEFAULT_CERTIFICATE_FINGERPRINT_FIELD.into()),
            key_fingerprint_field: self
                .key_fingerprint_field
                .unwrap_or_else(|| DEFAULT_KEY_FINGERPRINT_FIELD.into()),
            value_encoding: self.value_encoding,
            encryption_rules,
            decryption_rules,
        })
    }
}

fn parse_rules(paths: &[(String, String)]) -> CryptoResult<Vec<FieldRule>> {
    paths
        .iter()
        .map(|(source, target)| {
            Ok(FieldRule {
                source: FieldPath::parse(source)?,
                target: FieldPath::parse(target)?,
            })
        })
        .collect()
}
