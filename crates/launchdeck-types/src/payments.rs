//! Payment shapes passed between the checkout flow and the payment provider.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw card details as entered in the payment form.
///
/// Only ever sent to the payment provider's tokenization endpoint; the
/// marketplace backend never sees these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDetails {
    pub number: String,
    pub exp_month: u8,
    pub exp_year: u16,
    pub cvc: String,
}

/// Opaque single-use token standing in for a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardToken {
    pub id: String,
}

/// Outcome of confirming a charge against a payment intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    /// Provider-side intent id.
    pub id: String,
    /// Provider status string, e.g. `succeeded` or `requires_action`.
    pub status: String,
}

impl PaymentConfirmation {
    pub fn succeeded(&self) -> bool {
        self.status == "succeeded"
    }
}

/// A completed membership payment as recorded by the marketplace backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub email: String,
    /// Amount in the smallest currency unit (cents).
    pub amount: u64,
    pub transaction_id: String,
    pub paid_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confirmation_succeeded() {
        let ok = PaymentConfirmation {
            id: "pi_1".to_string(),
            status: "succeeded".to_string(),
        };
        let pending = PaymentConfirmation {
            id: "pi_2".to_string(),
            status: "requires_action".to_string(),
        };
        assert!(ok.succeeded());
        assert!(!pending.succeeded());
    }
}
