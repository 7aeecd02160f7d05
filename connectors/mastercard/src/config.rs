//! Gateway configuration.
//!
//! Scalar settings and key material paths arrive from the deployment's
//! config/secrets collaborator; [`GatewayConfig::build_gateway`] performs
//! the one-time load and wiring. Key loading failures are fatal here —
//! a gateway with unusable key material must not serve requests.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::info;
use xbs_crypto::{
    load_certificate, load_private_key, read_key_material, DecryptionKey,
    FieldLevelEncryptionConfig, OaepDigest,
};
use xbs_oauth::OAuth1Signer;

use crate::error::{GatewayError, GatewayResult};
use crate::gateway::QuotesGateway;
use crate::transport::HttpTransport;

/// Encryption rule fixed by the quotes API contract.
const ENCRYPTION_PATH: (&str, &str) = ("$.transferAmount", "$.encryptedPayload");
/// Decryption rule fixed by the quotes API contract.
const DECRYPTION_PATH: (&str, &str) = ("$.encryptedPayload", "$.transferAmount");

/// Deserializable gateway settings.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// API base URL, e.g. `https://sandbox.api.mastercard.com`.
    pub base_url: String,
    /// Partner identifier embedded in the quotes URL.
    pub partner_id: String,
    /// OAuth consumer key issued by the counterparty.
    pub consumer_key: String,
    /// Path to the PKCS#8 PEM signing key.
    pub signing_key_path: PathBuf,
    /// Path to the recipient's X.509 encryption certificate (PEM).
    pub encryption_certificate_path: PathBuf,
    /// Path to the PKCS#8 PEM key used to decrypt responses.
    pub decryption_key_path: PathBuf,
    /// OAEP digest algorithm name; defaults to SHA-512.
    #[serde(default = "default_oaep_digest")]
    pub oaep_digest: String,
}

fn default_oaep_digest() -> String {
    "SHA-512".into()
}

impl GatewayConfig {
    /// Load key material and assemble a ready-to-use gateway.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Config`] when key material is absent or
    /// malformed, or the encryption configuration is inconsistent.
    pub fn build_gateway(&self) -> GatewayResult<QuotesGateway<HttpTransport>> {
        let signing_pem =
            read_key_material(&self.signing_key_path).map_err(GatewayError::Config)?;
        let signing_key = load_private_key(&signing_pem).map_err(GatewayError::Config)?;

        let certificate_pem =
            read_key_material(&self.encryption_certificate_path).map_err(GatewayError::Config)?;
        let certificate = load_certificate(&certificate_pem).map_err(GatewayError::Config)?;

        let decryption_pem =
            read_key_material(&self.decryption_key_path).map_err(GatewayError::Config)?;
        let decryption_key =
            DecryptionKey::from_pem(&decryption_pem).map_err(GatewayError::Config)?;

        let digest = OaepDigest::from_name(&self.oaep_digest).map_err(GatewayError::Config)?;

        let encryption = FieldLevelEncryptionConfig::builder()
            .with_encryption_certificate(certificate)
            .with_decryption_key(decryption_key)
            .with_oaep_digest(digest)
            .with_encryption_path(ENCRYPTION_PATH.0, ENCRYPTION_PATH.1)
            .with_decryption_path(DECRYPTION_PATH.0, DECRYPTION_PATH.1)
            .build()
            .map_err(GatewayError::Config)?;

        let signer = OAuth1Signer::new(self.consumer_key.clone(), signing_key);
        let transport = HttpTransport::new()?;

        info!(partner_id = %self.partner_id, "gateway configured");
        Ok(QuotesGateway::new(
            transport,
            self.base_url.clone(),
            self.partner_id.clone(),
            signer,
            encryption,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xbs_crypto::CryptoError;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    fn sample_config() -> GatewayConfig {
        serde_json::from_value(serde_json::json!({
            "base_url": "https://sandbox.api.mastercard.com",
            "partner_id": "ptnr-test",
            "consumer_key": "consumer!key",
            "signing_key_path": fixture_path("key_pkcs8.pem"),
            "encryption_certificate_path": fixture_path("cert.pem"),
            "decryption_key_path": fixture_path("key_pkcs8.pem"),
        }))
        .unwrap()
    }

    #[test]
    fn builds_gateway_from_fixtures() {
        let gateway = sample_config().build_gateway().unwrap();
        assert!(gateway.quotes_url().ends_with("/send/v1/partners/ptnr-test/crossborder/quotes"));
    }

    #[test]
    fn digest_defaults_to_sha512() {
        assert_eq!(sample_config().oaep_digest, "SHA-512");
    }

    #[test]
    fn missing_key_file_is_fatal() {
        let mut config = sample_config();
        config.signing_key_path = fixture_path("does_not_exist.pem");
        let err = config.build_gateway().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Config(CryptoError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn invalid_certificate_is_fatal() {
        let mut config = sample_config();
        // A private key is not an X.509 certificate.
        config.encryption_certificate_path = fixture_path("key_pkcs8.pem");
        let err = config.build_gateway().unwrap_err();
        assert!(matches!(err, GatewayError::Config(CryptoError::KeyFormat(_))));
    }

    #[test]
    fn unsupported_digest_is_fatal() {
        let mut config = sample_config();
        config.oaep_digest = "MD5".into();
        let err = config.build_gateway().unwrap_err();
        assert!(matches!(
            err,
            GatewayError::Config(CryptoError::InvalidConfig(_))
        ));
    }
}
