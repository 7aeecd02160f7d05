//! Gateway error types.

use thiserror::Error;
use xbs_crypto::CryptoError;
use xbs_oauth::SigningError;

/// Pipeline stage a failure originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Serializing the business payload.
    Build,
    /// Field-level encryption of the outbound payload.
    Encrypt,
    /// Computing the request signature.
    Sign,
    /// The HTTP exchange itself.
    Send,
    /// Field-level decryption of the response.
    Decrypt,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Build => "build",
            Self::Encrypt => "encrypt",
            Self::Sign => "sign",
            Self::Send => "send",
            Self::Decrypt => "decrypt",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the gateway.
///
/// Configuration failures are fatal at startup; everything else is
/// per-request and recoverable. Messages never carry key material or field
/// plaintext.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Loading key material or building the encryption config failed.
    #[error("gateway configuration failed: {0}")]
    Config(#[source] CryptoError),

    /// A cryptographic stage failed.
    #[error("{stage} stage failed: {source}")]
    Crypto {
        /// Originating stage.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: CryptoError,
    },

    /// Request signing failed.
    #[error("sign stage failed: {0}")]
    Signing(#[from] SigningError),

    /// Payload serialization or response parsing failed.
    #[error("{stage} stage failed: {source}")]
    Payload {
        /// Originating stage.
        stage: Stage,
        /// Underlying failure.
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP exchange failed before a response was received.
    #[error("send stage failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The counterparty answered with a non-success status.
    #[error("API returned status {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body as returned.
        body: String,
    },
}

impl GatewayError {
    /// The pipeline stage this error originated from, if per-request.
    #[must_use]
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::Config(_) => None,
            Self::Crypto { stage, .. } | Self::Payload { stage, .. } => Some(*stage),
            Self::Signing(_) => Some(Stage::Sign),
            Self::Http(_) | Self::Api { .. } => Some(Stage::Send),
        }
    }
}

/// Result type for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_report_their_stage() {
        let err = GatewayError::Crypto {
            stage: Stage::Encrypt,
            source: CryptoError::MissingCertificate,
        };
        assert_eq!(err.stage(), Some(Stage::Encrypt));
        assert!(err.to_string().starts_with("encrypt stage failed"));

        let err = GatewayError::Api {
            status: 401,
            body: "unauthorized".into(),
        };
        assert_eq!(err.stage(), Some(Stage::Send));

        let err = GatewayError::Config(CryptoError::MissingDecryptionKey);
        assert_eq!(err.stage(), None);
    }
}
