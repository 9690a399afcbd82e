//! Thin typed clients for the marketplace backend.
//!
//! These are direct pass-throughs: build the request, deserialize the JSON
//! the server returns. There is no retry or backoff anywhere; every failure
//! is returned to the call site, which surfaces it as a notification.

mod coupons;
mod payments;
mod products;
mod reviews;
mod stats;

pub use products::ProductQuery;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;

/// Client for the marketplace REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Starts a request against `path`, tagging it with a fresh request id
    /// so backend logs can be correlated with client traces.
    pub(crate) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request_id = uuid::Uuid::new_v4();
        tracing::trace!(%method, path, %request_id, "api request");
        self.http
            .request(method, format!("{}{path}", self.base_url))
            .header("x-request-id", request_id.to_string())
    }

    /// Sends a request and deserializes a JSON body.
    pub(crate) async fn send_json<T: DeserializeOwned>(
        builder: RequestBuilder,
        what: &str,
    ) -> Result<T> {
        let response = builder
            .send()
            .await
            .with_context(|| format!("{what}: request failed"))?
            .error_for_status()
            .with_context(|| format!("{what}: backend rejected the request"))?;
        response
            .json()
            .await
            .with_context(|| format!("{what}: malformed response body"))
    }

    /// Sends a request where only the status matters.
    pub(crate) async fn send_ok(builder: RequestBuilder, what: &str) -> Result<()> {
        builder
            .send()
            .await
            .with_context(|| format!("{what}: request failed"))?
            .error_for_status()
            .with_context(|| format!("{what}: backend rejected the request"))?;
        Ok(())
    }
}
