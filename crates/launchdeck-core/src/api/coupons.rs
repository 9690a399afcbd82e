//! Coupon endpoints. Listing is public; the rest is the admin surface.

use anyhow::Result;
use launchdeck_types::catalog::{Coupon, CouponDraft};
use reqwest::Method;

use super::ApiClient;

impl ApiClient {
    /// Coupons currently redeemable (the backend filters out expired ones).
    pub async fn valid_coupons(&self) -> Result<Vec<Coupon>> {
        let builder = self.request(Method::GET, "/coupons/valid");
        Self::send_json(builder, "valid coupons").await
    }

    pub async fn all_coupons(&self) -> Result<Vec<Coupon>> {
        let builder = self.request(Method::GET, "/coupons");
        Self::send_json(builder, "all coupons").await
    }

    pub async fn create_coupon(&self, draft: &CouponDraft) -> Result<Coupon> {
        let builder = self.request(Method::POST, "/coupons").json(draft);
        Self::send_json(builder, "create coupon").await
    }

    pub async fn update_coupon(&self, id: &str, draft: &CouponDraft) -> Result<Coupon> {
        let builder = self
            .request(Method::PUT, &format!("/coupons/{id}"))
            .json(draft);
        Self::send_json(builder, "update coupon").await
    }

    pub async fn delete_coupon(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/coupons/{id}"));
        Self::send_ok(builder, "delete coupon").await
    }
}
