//! Thin client for the card payment provider.
//!
//! Covers exactly what the checkout flow needs: tokenize a card, then
//! confirm a charge against a payment intent the backend created. Failures
//! are returned to the caller; nothing is retried.

use launchdeck_types::payments::{CardDetails, CardToken, PaymentConfirmation};
use serde::Deserialize;

/// Default base URL for the hosted payment service.
pub const DEFAULT_BASE_URL: &str = "https://api.stripe.com";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("the card was declined")]
    CardDeclined,

    #[error("malformed payment intent client secret")]
    InvalidClientSecret,

    #[error("payment provider rejected the request: {0}")]
    Rejected(String),

    #[error("payment provider request failed")]
    Network(#[from] reqwest::Error),
}

/// Client for the payment provider's tokenization and confirmation
/// endpoints. Authenticated with the publishable (client-side) key.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    base_url: String,
    publishable_key: String,
    http: reqwest::Client,
}

impl PaymentClient {
    pub fn new(publishable_key: impl Into<String>) -> Self {
        Self::with_base_url(publishable_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        publishable_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            publishable_key: publishable_key.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Exchanges raw card details for a single-use token.
    pub async fn tokenize_card(&self, card: &CardDetails) -> Result<CardToken, PaymentError> {
        let form = [
            ("card[number]", card.number.clone()),
            ("card[exp_month]", card.exp_month.to_string()),
            ("card[exp_year]", card.exp_year.to_string()),
            ("card[cvc]", card.cvc.clone()),
        ];
        let response = self
            .http
            .post(format!("{}/v1/tokens", self.base_url))
            .bearer_auth(&self.publishable_key)
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            let token: TokenResponse = response.json().await?;
            Ok(CardToken { id: token.id })
        } else {
            Err(map_failure(response).await)
        }
    }

    /// Confirms the charge for the intent identified by `client_secret`
    /// using a previously tokenized card.
    pub async fn confirm_payment(
        &self,
        client_secret: &str,
        token: &CardToken,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let intent_id = intent_id_from_secret(client_secret)?;
        let form = [
            ("client_secret", client_secret.to_string()),
            ("payment_method_data[type]", "card".to_string()),
            ("payment_method_data[card][token]", token.id.clone()),
        ];
        let response = self
            .http
            .post(format!(
                "{}/v1/payment_intents/{intent_id}/confirm",
                self.base_url
            ))
            .bearer_auth(&self.publishable_key)
            .form(&form)
            .send()
            .await?;

        if response.status().is_success() {
            let intent: IntentResponse = response.json().await?;
            Ok(PaymentConfirmation {
                id: intent.id,
                status: intent.status,
            })
        } else {
            Err(map_failure(response).await)
        }
    }
}

/// The intent id is the prefix of its client secret (`pi_123_secret_abc`).
fn intent_id_from_secret(client_secret: &str) -> Result<&str, PaymentError> {
    client_secret
        .split_once("_secret_")
        .map(|(id, _)| id)
        .filter(|id| !id.is_empty())
        .ok_or(PaymentError::InvalidClientSecret)
}

async fn map_failure(response: reqwest::Response) -> PaymentError {
    let status = response.status();
    match response.json::<ErrorEnvelope>().await {
        Ok(envelope) if envelope.error.code.as_deref() == Some("card_declined") => {
            PaymentError::CardDeclined
        }
        Ok(envelope) => PaymentError::Rejected(envelope.error.message),
        Err(_) => PaymentError::Rejected(format!("unexpected HTTP {status}")),
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct IntentResponse {
    id: String,
    status: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    message: String,
}
