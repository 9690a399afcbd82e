//! Review endpoints.

use anyhow::Result;
use launchdeck_types::catalog::{NewReview, Review};
use reqwest::Method;

use super::ApiClient;

impl ApiClient {
    pub async fn product_reviews(&self, product_id: &str) -> Result<Vec<Review>> {
        let builder = self.request(Method::GET, &format!("/reviews/{product_id}"));
        Self::send_json(builder, "product reviews").await
    }

    pub async fn post_review(&self, review: &NewReview) -> Result<Review> {
        let builder = self.request(Method::POST, "/reviews").json(review);
        Self::send_json(builder, "post review").await
    }
}
