//! Business payload types for the quotes API.

use serde::{Deserialize, Serialize};

/// Kind of quote requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuoteType {
    /// Binding quote, honored at transfer time.
    Firm,
    /// Non-binding estimate.
    Indicative,
}

/// Amount and currency of a transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferAmount {
    /// ISO 4217 currency code.
    pub currency: String,
    /// Decimal amount as a string, e.g. `"100.00"`.
    pub amount: String,
}

impl TransferAmount {
    /// Create a transfer amount.
    #[must_use]
    pub fn new(currency: impl Into<String>, amount: impl Into<String>) -> Self {
        Self {
            currency: currency.into(),
            amount: amount.into(),
        }
    }
}

/// A cross-border quote request as sent to the counterparty.
///
/// The `transferAmount` field is replaced by an encrypted envelope before
/// the payload leaves the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    /// Amount to transfer; encrypted on the wire.
    pub transfer_amount: TransferAmount,
    /// URI identifying the sending account.
    pub sender_account_uri: String,
    /// URI identifying the receiving account.
    pub recipient_account_uri: String,
    /// Firm or indicative.
    pub quote_type: QuoteType,
}

impl QuoteRequest {
    /// Create a firm quote request.
    #[must_use]
    pub fn firm(
        transfer_amount: TransferAmount,
        sender_account_uri: impl Into<String>,
        recipient_account_uri: impl Into<String>,
    ) -> Self {
        Self {
            transfer_amount,
            sender_account_uri: sender_account_uri.into(),
            recipient_account_uri: recipient_account_uri.into(),
            quote_type: QuoteType::Firm,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn wire_shape_is_camel_case() {
        let request = QuoteRequest::firm(
            TransferAmount::new("USD", "100.00"),
            "urn:example:account:sender",
            "urn:example:account:recipient",
        );
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "transferAmount": {"currency": "USD", "amount": "100.00"},
                "senderAccountUri": "urn:example:account:sender",
                "recipientAccountUri": "urn:example:account:recipient",
                "quoteType": "FIRM",
            })
        );
    }

    #[test]
    fn quote_type_round_trips() {
        for quote_type in [QuoteType::Firm, QuoteType::Indicative] {
            let encoded = serde_json::to_string(&quote_type).unwrap();
            let decoded: QuoteType = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, quote_type);
        }
    }
}
