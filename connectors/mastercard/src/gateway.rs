//! The quote request orchestrator.
//!
//! Owns no cryptography: it sequences BUILD, ENCRYPT, SIGN, SEND and
//! DECRYPT over the collaborators and tags any failure with the stage it
//! came from. One request maps to exactly one signed HTTP exchange.

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, instrument};
use xbs_crypto::{decrypt_payload, encrypt_payload, FieldLevelEncryptionConfig};
use xbs_oauth::OAuth1Signer;

use crate::error::{GatewayError, GatewayResult, Stage};
use crate::transport::{HttpTransport, Transport};
use crate::types::QuoteRequest;

/// Gateway for the cross-border quotes API.
///
/// Immutable after construction and safe to share across concurrent
/// requests; every call operates only on its own request-scoped data.
#[derive(Debug)]
pub struct QuotesGateway<T = HttpTransport> {
    transport: T,
    base_url: String,
    partner_id: String,
    signer: OAuth1Signer,
    encryption: FieldLevelEncryptionConfig,
}

impl<T: Transport> QuotesGateway<T> {
    /// Assemble a gateway from its collaborators.
    #[must_use]
    pub fn new(
        transport: T,
        base_url: impl Into<String>,
        partner_id: impl Into<String>,
        signer: OAuth1Signer,
        encryption: FieldLevelEncryptionConfig,
    ) -> Self {
        Self {
            transport,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            partner_id: partner_id.into(),
            signer,
            encryption,
        }
    }

    /// The underlying transport.
    #[must_use]
    pub const fn transport(&self) -> &T {
        &self.transport
    }

    /// URL of the quotes operation.
    #[must_use]
    pub fn quotes_url(&self) -> String {
        format!(
            "{}/send/v1/partners/{}/crossborder/quotes",
            self.base_url, self.partner_id
        )
    }

    /// Create a quote: encrypt the payload, sign the request, send it, and
    /// decrypt the response.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] tagged with the originating stage. The
    /// caller never sees a partially transformed document.
    #[instrument(skip(self, request), fields(partner_id = %self.partner_id))]
    pub async fn create_quote(&self, request: &QuoteRequest) -> GatewayResult<Value> {
        let payload = serde_json::to_value(request).map_err(|e| GatewayError::Payload {
            stage: Stage::Build,
            source: e,
        })?;

        let encrypted = encrypt_payload(&payload, &self.encryption).map_err(|e| {
            GatewayError::Crypto {
                stage: Stage::Encrypt,
                source: e,
            }
        })?;
        let body = serde_json::to_string(&encrypted).map_err(|e| GatewayError::Payload {
            stage: Stage::Encrypt,
            source: e,
        })?;

        let url = self.quotes_url();
        let authorization = self
            .signer
            .authorization_header("POST", &url, body.as_bytes())?;

        debug!(url = %url, "sending quote request");
        let response = self
            .transport
            .send(
                Method::POST,
                &url,
                vec![
                    ("Authorization".into(), authorization),
                    ("Content-Type".into(), "application/json".into()),
                    ("Accept".into(), "application/json".into()),
                ],
                Some(body),
            )
            .await?;

        if !response.is_success() {
            return Err(GatewayError::Api {
                status: response.status,
                body: response.body,
            });
        }

        let document: Value =
            serde_json::from_str(&response.body).map_err(|e| GatewayError::Payload {
                stage: Stage::Decrypt,
                source: e,
            })?;
        let decrypted = decrypt_payload(&document, &self.encryption).map_err(|e| {
            GatewayError::Crypto {
                stage: Stage::Decrypt,
                source: e,
            }
        })?;

        info!("quote created");
        Ok(decrypted)
    }

    /// Connectivity check: fetch the supported countries list.
    ///
    /// Signed like every other call but carries no encrypted fields.
    ///
    /// # Errors
    ///
    /// Returns a [`GatewayError`] tagged with the originating stage.
    #[instrument(skip(self))]
    pub async fn list_countries(&self) -> GatewayResult<Value> {
        let url = format!("{}/crossborder/v1/countries", self.base_url);
        let authorization = self.signer.authorization_header("GET", &url, b"")?;

        let response = self
            .transport
            .send(
                Method::GET,
                &url,
                vec![
                    ("Authorization".into(), authorization),
                    ("Accept".into(), "application/json".into()),
                ],
                None,
            )
            .await?;

        if !response.is_success() {
            return Err(GatewayError::Api {
                status: response.status,
                body: response.body,
            });
        }

        serde_json::from_str(&response.body).map_err(|e| GatewayError::Payload {
            stage: Stage::Send,
            source: e,
        })
    }
}
