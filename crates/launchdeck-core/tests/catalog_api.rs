//! Integration tests for the marketplace API clients.

use launchdeck_core::api::{ApiClient, ProductQuery};
use launchdeck_types::catalog::{CouponDraft, NewProduct, NewReview, ProductStatus};
use launchdeck_types::payments::PaymentRecord;
use serde_json::{Value, json};
use wiremock::matchers::{body_partial_json, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn product_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "description": "A product",
        "tags": ["ai"],
        "owner_name": "Ada",
        "owner_email": "a@b.com",
        "upvotes": 3,
        "status": "accepted",
        "created_at": "2025-11-02T10:00:00Z",
    })
}

#[tokio::test]
async fn test_list_products_passes_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .and(query_param("search", "ai"))
        .and(query_param("page", "2"))
        .and(header_exists("x-request-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": [product_json("p1", "Widget")],
            "total": 41,
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let query = ProductQuery {
        search: Some("ai".to_string()),
        page: Some(2),
        limit: None,
    };
    let page = client.list_products(&query).await.unwrap();
    assert_eq!(page.total, 41);
    assert_eq!(page.products[0].name, "Widget");
    assert_eq!(page.products[0].status, ProductStatus::Accepted);
}

#[tokio::test]
async fn test_submit_product_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/products"))
        .and(body_partial_json(json!({
            "name": "Widget",
            "owner_email": "a@b.com",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(product_json("p9", "Widget")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let draft = NewProduct {
        name: "Widget".to_string(),
        description: "A product".to_string(),
        image: None,
        tags: vec!["ai".to_string()],
        external_link: None,
        owner_name: "Ada".to_string(),
        owner_email: "a@b.com".to_string(),
        owner_image: None,
    };
    let product = client.submit_product(&draft).await.unwrap();
    assert_eq!(product.id, "p9");
}

#[tokio::test]
async fn test_upvote_hits_patch_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/products/p1/upvote"))
        .respond_with(ResponseTemplate::new(200).set_body_json(product_json("p1", "Widget")))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let product = client.upvote_product("p1").await.unwrap();
    assert_eq!(product.upvotes, 3);
}

#[tokio::test]
async fn test_moderation_status_update() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/products/p1/status"))
        .and(body_partial_json(json!({ "status": "accepted" })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    client
        .set_product_status("p1", ProductStatus::Accepted)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_backend_error_is_surfaced_with_context() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/missing"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.product("missing").await.unwrap_err();
    assert!(err.to_string().contains("fetch product"));
}

#[tokio::test]
async fn test_reviews_roundtrip() {
    let server = MockServer::start().await;
    let review = json!({
        "id": "r1",
        "product_id": "p1",
        "reviewer_name": "Ada",
        "description": "Great",
        "rating": 4.5,
        "created_at": "2025-11-02T10:00:00Z",
    });
    Mock::given(method("GET"))
        .and(path("/reviews/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([review])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/reviews"))
        .and(body_partial_json(json!({ "product_id": "p1", "rating": 4.5 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(review))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let reviews = client.product_reviews("p1").await.unwrap();
    assert_eq!(reviews.len(), 1);

    let posted = client
        .post_review(&NewReview {
            product_id: "p1".to_string(),
            reviewer_name: "Ada".to_string(),
            reviewer_image: None,
            description: "Great".to_string(),
            rating: 4.5,
        })
        .await
        .unwrap();
    assert_eq!(posted.id, "r1");
}

#[tokio::test]
async fn test_coupon_admin_crud() {
    let server = MockServer::start().await;
    let coupon = json!({
        "id": "c1",
        "code": "LAUNCH10",
        "description": "10% off",
        "discount_percent": 10,
        "expires_at": "2026-01-01T00:00:00Z",
    });
    Mock::given(method("POST"))
        .and(path("/coupons"))
        .and(body_partial_json(json!({ "code": "LAUNCH10" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(coupon))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/coupons/c1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let created = client
        .create_coupon(&CouponDraft {
            code: "LAUNCH10".to_string(),
            description: "10% off".to_string(),
            discount_percent: 10,
            expires_at: "2026-01-01T00:00:00Z".parse().unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(created.id, "c1");

    client.delete_coupon("c1").await.unwrap();
}

#[tokio::test]
async fn test_site_statistics() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/statistics"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "products": 120,
            "accepted": 80,
            "pending": 25,
            "reviews": 300,
            "users": 64,
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let stats = client.site_statistics().await.unwrap();
    assert_eq!(stats.products, 120);
    assert_eq!(stats.users, 64);
}

#[tokio::test]
async fn test_record_payment() {
    let server = MockServer::start().await;
    let record = json!({
        "email": "a@b.com",
        "amount": 990,
        "transaction_id": "pi_123",
        "paid_at": "2025-11-02T10:00:00Z",
    });
    Mock::given(method("POST"))
        .and(path("/payments"))
        .and(body_partial_json(json!({ "transaction_id": "pi_123" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(record))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let saved = client
        .record_payment(&PaymentRecord {
            email: "a@b.com".to_string(),
            amount: 990,
            transaction_id: "pi_123".to_string(),
            paid_at: "2025-11-02T10:00:00Z".parse().unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(saved.amount, 990);
}
