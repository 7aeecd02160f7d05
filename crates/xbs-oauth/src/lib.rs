//! OAuth 1.0a request signing for the cross-border payments API.
//!
//! The counterparty authenticates every call with a one-time signature over
//! the request: method, normalized URL, sorted OAuth protocol parameters,
//! and a SHA-256 hash of the request body (`oauth_body_hash`), signed with
//! RSA-SHA256. This payload-aware variant distinguishes the scheme from
//! classic OAuth 1.0a, which signs form parameters instead of a body hash.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use xbs_oauth::OAuth1Signer;
//!
//! let signer = OAuth1Signer::new(consumer_key, signing_key);
//! let header = signer.authorization_header(
//!     "POST",
//!     "https://api.example.com/send/v1/partners/p1/crossborder/quotes",
//!     body.as_bytes(),
//! )?;
//! // header: `OAuth oauth_body_hash="...", oauth_consumer_key="...", ...`
//! ```
//!
//! Signatures must be generated fresh for every request: a reused
//! nonce/timestamp pair is rejected by the counterparty, so there is no
//! caching layer here by design.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

mod error;
mod signer;

pub use error::*;
pub use signer::*;
