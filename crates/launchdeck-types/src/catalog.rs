//! DTOs for the marketplace backend's catalog endpoints.
//!
//! These mirror the JSON the REST API returns; the clients in
//! `launchdeck-core::api` deserialize straight into them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Moderation state of a submitted product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Pending,
    Accepted,
    Rejected,
}

/// A launched (or submitted) digital product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub external_link: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    #[serde(default)]
    pub owner_image: Option<String>,
    #[serde(default)]
    pub upvotes: u64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub reported: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for submitting a new product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
    pub owner_name: String,
    pub owner_email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_image: Option<String>,
}

/// Partial update to an owned product. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_link: Option<String>,
}

/// One page of a product listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total matching products across all pages.
    pub total: u64,
}

/// A posted review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: String,
    pub product_id: String,
    pub reviewer_name: String,
    #[serde(default)]
    pub reviewer_image: Option<String>,
    pub description: String,
    pub rating: f32,
    pub created_at: DateTime<Utc>,
}

/// Payload for posting a review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub product_id: String,
    pub reviewer_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_image: Option<String>,
    pub description: String,
    pub rating: f32,
}

/// A membership discount coupon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub description: String,
    pub discount_percent: u8,
    pub expires_at: DateTime<Utc>,
}

impl Coupon {
    /// True if the coupon can still be redeemed at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Payload for creating or updating a coupon (admin surface).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CouponDraft {
    pub code: String,
    pub description: String,
    pub discount_percent: u8,
    pub expires_at: DateTime<Utc>,
}

/// Aggregate counts for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteStatistics {
    pub products: u64,
    pub accepted: u64,
    pub pending: u64,
    pub reviews: u64,
    pub users: u64,
}
