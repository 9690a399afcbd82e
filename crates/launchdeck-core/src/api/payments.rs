//! Membership payment records kept by the backend.
//!
//! The charge itself happens against the payment provider; the backend only
//! stores the outcome for the subscription dashboard.

use anyhow::Result;
use launchdeck_types::payments::PaymentRecord;
use reqwest::Method;

use super::ApiClient;

impl ApiClient {
    pub async fn record_payment(&self, record: &PaymentRecord) -> Result<PaymentRecord> {
        let builder = self.request(Method::POST, "/payments").json(record);
        Self::send_json(builder, "record payment").await
    }

    pub async fn payment_history(&self, email: &str) -> Result<Vec<PaymentRecord>> {
        let builder = self.request(Method::GET, &format!("/payments/{email}"));
        Self::send_json(builder, "payment history").await
    }
}
