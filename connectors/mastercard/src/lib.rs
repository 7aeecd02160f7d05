//! Mastercard cross-border payments gateway connector.
//!
//! Accepts an internal "create quote" request, turns it into a signed,
//! field-encrypted API call, and returns the decrypted result. The flow is
//! a linear pipeline with no retries and no branching:
//!
//! ```text
//! BUILD -> ENCRYPT -> SIGN -> SEND -> DECRYPT -> DONE
//! ```
//!
//! Any stage failure surfaces as a [`GatewayError`] tagged with the stage
//! it originated from; a failed request never yields a partially encrypted
//! or partially decrypted document. Cryptography lives in `xbs-crypto` and
//! `xbs-oauth`; this crate only sequences the stages and owns the transport.

#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod gateway;
pub mod transport;
pub mod types;

pub use config::GatewayConfig;
pub use error::{GatewayError, GatewayResult, Stage};
pub use gateway::QuotesGateway;
pub use transport::{HttpTransport, Transport, TransportResponse};
pub use types::{QuoteRequest, QuoteType, TransferAmount};
