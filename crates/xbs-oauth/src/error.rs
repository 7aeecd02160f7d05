//! Signing error types.

/// Errors that can occur while signing a request.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    /// The private key could not produce an RSA-SHA256 signature.
    #[error("signing key rejected: {0}")]
    Key(String),

    /// URL parsing failed.
    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),
}

/// Result type for signing operations.
pub type SigningResult<T> = Result<T, SigningError>;
