//! Product endpoints: browsing, submission, voting and moderation.

use anyhow::Result;
use launchdeck_types::catalog::{NewProduct, Product, ProductPage, ProductPatch, ProductStatus};
use reqwest::Method;
use serde_json::json;

use super::ApiClient;

/// Query parameters for the paginated product listing.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    /// Tag or name search term.
    pub search: Option<String>,
    /// Zero-based page index.
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

impl ApiClient {
    /// Lists accepted products, optionally filtered and paginated.
    pub async fn list_products(&self, query: &ProductQuery) -> Result<ProductPage> {
        let builder = self
            .request(Method::GET, "/products")
            .query(&query.params());
        Self::send_json(builder, "list products").await
    }

    pub async fn featured_products(&self) -> Result<Vec<Product>> {
        let builder = self.request(Method::GET, "/products/featured");
        Self::send_json(builder, "featured products").await
    }

    pub async fn trending_products(&self) -> Result<Vec<Product>> {
        let builder = self.request(Method::GET, "/products/trending");
        Self::send_json(builder, "trending products").await
    }

    pub async fn product(&self, id: &str) -> Result<Product> {
        let builder = self.request(Method::GET, &format!("/products/{id}"));
        Self::send_json(builder, "fetch product").await
    }

    /// Products submitted by one owner, for the "my products" dashboard.
    pub async fn products_by_owner(&self, email: &str) -> Result<Vec<Product>> {
        let builder = self.request(Method::GET, &format!("/products/owner/{email}"));
        Self::send_json(builder, "owner products").await
    }

    pub async fn submit_product(&self, product: &NewProduct) -> Result<Product> {
        let builder = self.request(Method::POST, "/products").json(product);
        Self::send_json(builder, "submit product").await
    }

    pub async fn update_product(&self, id: &str, patch: &ProductPatch) -> Result<Product> {
        let builder = self
            .request(Method::PATCH, &format!("/products/{id}"))
            .json(patch);
        Self::send_json(builder, "update product").await
    }

    pub async fn delete_product(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::DELETE, &format!("/products/{id}"));
        Self::send_ok(builder, "delete product").await
    }

    /// Upvotes a product and returns it with the new count.
    pub async fn upvote_product(&self, id: &str) -> Result<Product> {
        let builder = self.request(Method::PATCH, &format!("/products/{id}/upvote"));
        Self::send_json(builder, "upvote product").await
    }

    pub async fn report_product(&self, id: &str) -> Result<()> {
        let builder = self.request(Method::PATCH, &format!("/products/{id}/report"));
        Self::send_ok(builder, "report product").await
    }

    /// Moderation queue: submissions awaiting review, pending first.
    pub async fn review_queue(&self) -> Result<Vec<Product>> {
        let builder = self.request(Method::GET, "/products/review-queue");
        Self::send_json(builder, "review queue").await
    }

    /// Moderation queue: products flagged by users.
    pub async fn reported_products(&self) -> Result<Vec<Product>> {
        let builder = self.request(Method::GET, "/products/reported");
        Self::send_json(builder, "reported products").await
    }

    /// Accepts or rejects a submission.
    pub async fn set_product_status(&self, id: &str, status: ProductStatus) -> Result<()> {
        let builder = self
            .request(Method::PATCH, &format!("/products/{id}/status"))
            .json(&json!({ "status": status }));
        Self::send_ok(builder, "set product status").await
    }

    pub async fn set_product_featured(&self, id: &str, featured: bool) -> Result<()> {
        let builder = self
            .request(Method::PATCH, &format!("/products/{id}/feature"))
            .json(&json!({ "featured": featured }));
        Self::send_ok(builder, "set product featured").await
    }
}
