//! The encrypted-field envelope.
//!
//! An envelope is the JSON object that replaces a plaintext field: the
//! AES-GCM ciphertext, the RSA-wrapped symmetric key, the nonce, and the
//! fingerprints identifying which certificate/key pair produced it. Field
//! names and value encoding come from the configuration.

use serde_json::{Map, Value};

use crate::config::FieldLevelEncryptionConfig;
use crate::error::{CryptoError, CryptoResult};
use crate::path::FieldPath;

/// Decoded form of one encrypted field.
#[derive(Debug, Clone)]
pub struct FieldEnvelope {
    /// AES-GCM ciphertext with the authentication tag appended.
    pub encrypted_value: Vec<u8>,
    /// RSA-OAEP-wrapped symmetric key.
    pub encrypted_key: Vec<u8>,
    /// AES-GCM nonce.
    pub iv: Vec<u8>,
    /// Hex SHA-256 fingerprint of the recipient certificate.
    pub certificate_fingerprint: String,
    /// Hex SHA-256 fingerprint of the recipient public key.
    pub key_fingerprint: String,
}

impl FieldEnvelope {
    /// Render the envelope as a JSON object using the configured field
    /// names and value encoding.
    #[must_use]
    pub fn to_value(&self, config: &FieldLevelEncryptionConfig) -> Value {
        let encoding = config.value_encoding;
        let mut map = Map::new();
        map.insert(
            config.encrypted_value_field.clone(),
            Value::String(encoding.encode(&self.encrypted_value)),
        );
        map.insert(
            config.encrypted_key_field.clone(),
            Value::String(encoding.encode(&self.encrypted_key)),
        );
        map.insert(
            config.iv_field.clone(),
            Value::String(encoding.encode(&self.iv)),
        );
        map.insert(
            config.certificate_fingerprint_field.clone(),
            Value::String(self.certificate_fingerprint.clone()),
        );
        map.insert(
            config.key_fingerprint_field.clone(),
            Value::String(self.key_fingerprint.clone()),
        );
        Value::Object(map)
    }

    /// Parse an envelope from a document value.
    ///
    /// All five configured sub-fields must be present and decodable.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::MalformedEnvelope`] naming `path` otherwise.
    pub fn from_value(
        value: &Value,
        config: &FieldLevelEncryptionConfig,
        path: &FieldPath,
    ) -> CryptoResult<Self> {
        let map = value.as_object().ok_or_else(|| malformed(path, "not a JSON object"))?;

        let encoded = |field: &str| -> CryptoResult<String> {
            map.get(field)
                .and_then(Value::as_str)
                .map(str::to_owned)
                .ok_or_else(|| malformed(path, &format!("missing or non-string field `{field}`")))
        };
        let decoded = |field: &str| -> CryptoResult<Vec<u8>> {
            config
                .value_encoding
                .decode(&encoded(field)?)
                .ok_or_else(|| malformed(path, &format!("invalid encoding in field `{field}`")))
        };

        Ok(Self {
            encrypted_value: decoded(&config.encrypted_value_field)?,
            encrypted_key: decoded(&config.encrypted_key_field)?,
            iv: decoded(&config.iv_field)?,
            certificate_fingerprint: encoded(&config.certificate_fingerprint_field)?,
            key_fingerprint: encoded(&config.key_fingerprint_field)?,
        })
    }
}

fn malformed(path: &FieldPath, reason: &str) -> CryptoError {
    CryptoError::MalformedEnvelope {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::DecryptionKey;
    use serde_json::json;

    const KEY_PEM: &[u8] = include_bytes!("../tests/fixtures/key_pkcs8.pem");

    fn test_config() -> FieldLevelEncryptionConfig {
        FieldLevelEncryptionConfig::builder()
            .with_decryption_key(DecryptionKey::from_pem(KEY_PEM).unwrap())
            .build()
            .unwrap()
    }

    fn sample() -> FieldEnvelope {
        FieldEnvelope {
            encrypted_value: vec![1, 2, 3],
            encrypted_key: vec![4, 5, 6],
            iv: vec![7, 8, 9],
            certificate_fingerprint: "aa".repeat(32),
            key_fingerprint: "bb".repeat(32),
        }
    }

    #[test]
    fn renders_exactly_five_fields() {
        let config = test_config();
        let value = sample().to_value(&config);
        let map = value.as_object().unwrap();
        assert_eq!(map.len(), 5);
        for field in [
            "encryptedValue",
            "encryptedKey",
            "iv",
            "encryptionCertificateFingerprint",
            "encryptionKeyFingerprint",
        ] {
            assert!(map.contains_key(field), "{field}");
        }
    }

    #[test]
    fn value_round_trip() {
        let config = test_config();
        let envelope = sample();
        let parsed = FieldEnvelope::from_value(
            &envelope.to_value(&config),
            &config,
            &FieldPath::parse("$.encryptedPayload").unwrap(),
        )
        .unwrap();
        assert_eq!(parsed.encrypted_value, envelope.encrypted_value);
        assert_eq!(parsed.encrypted_key, envelope.encrypted_key);
        assert_eq!(parsed.iv, envelope.iv);
        assert_eq!(parsed.key_fingerprint, envelope.key_fingerprint);
    }

    #[test]
    fn rejects_missing_sub_field() {
        let config = test_config();
        let mut value = sample().to_value(&config);
        value.as_object_mut().unwrap().remove("iv");
        let err = FieldEnvelope::from_value(
            &value,
            &config,
            &FieldPath::parse("$.encryptedPayload").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::MalformedEnvelope { .. }));
    }

    #[test]
    fn rejects_undecodable_value() {
        let config = test_config();
        let mut value = sample().to_value(&config);
        value
            .as_object_mut()
            .unwrap()
            .insert("encryptedKey".into(), json!("%%not-base64%%"));
        let err = FieldEnvelope::from_value(
            &value,
            &config,
            &FieldPath::parse("$.encryptedPayload").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::MalformedEnvelope { .. }));
    }

    #[test]
    fn rejects_non_object() {
        let config = test_config();
        let err = FieldEnvelope::from_value(
            &json!("scalar"),
            &config,
            &FieldPath::parse("$.encryptedPayload").unwrap(),
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::MalformedEnvelope { .. }));
    }
}
