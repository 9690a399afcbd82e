//! Integration tests for the REST identity provider against a mock server.

use launchdeck_providers::identity::{
    FederatedCredential, IdentityConfig, IdentityError, IdentityProvider, RestIdentityProvider,
};
use launchdeck_types::{AuthEvent, ProfileUpdate};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> RestIdentityProvider {
    RestIdentityProvider::new(IdentityConfig::new("test-key").with_base_url(server.uri()))
}

fn account_ok(uid: &str, email: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "localId": uid,
        "email": email,
        "idToken": format!("token-{uid}"),
        "displayName": "Ada",
    }))
}

fn account_err(code: &str) -> ResponseTemplate {
    ResponseTemplate::new(400).set_body_json(json!({
        "error": { "code": 400, "message": code }
    }))
}

#[tokio::test]
async fn test_sign_up_returns_identity_and_emits_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "email": "a@b.com",
            "returnSecureToken": true,
        })))
        .respond_with(account_ok("u1", "a@b.com"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut events = provider.subscribe().unwrap();

    let identity = provider.sign_up("a@b.com", "hunter22").await.unwrap();
    assert_eq!(identity.uid, "u1");
    assert_eq!(identity.display_name.as_deref(), Some("Ada"));

    match events.recv().await.unwrap() {
        AuthEvent::SignedIn { identity } => assert_eq!(identity.email, "a@b.com"),
        other => panic!("expected SignedIn, got {other:?}"),
    }
}

#[tokio::test]
async fn test_sign_up_duplicate_email_maps_to_taxonomy() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(account_err("EMAIL_EXISTS"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider.sign_up("a@b.com", "hunter22").await.unwrap_err();
    assert!(matches!(err, IdentityError::EmailAlreadyInUse));
}

#[tokio::test]
async fn test_sign_in_bad_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(account_err("INVALID_LOGIN_CREDENTIALS"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider.sign_in("a@b.com", "wrong").await.unwrap_err();
    assert!(matches!(err, IdentityError::InvalidCredentials));
}

#[tokio::test]
async fn test_weak_password_with_trailing_explanation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signUp"))
        .respond_with(account_err(
            "WEAK_PASSWORD : Password should be at least 6 characters",
        ))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let err = provider.sign_up("a@b.com", "x").await.unwrap_err();
    assert!(matches!(err, IdentityError::WeakPassword));
}

#[tokio::test]
async fn test_federated_sign_in_exchanges_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithIdp"))
        .and(body_partial_json(json!({
            "postBody": "access_token=oauth-tok&providerId=google.com",
            "returnSecureToken": true,
        })))
        .respond_with(account_ok("u2", "fed@b.com"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let credential = FederatedCredential {
        provider_id: "google.com".to_string(),
        access_token: "oauth-tok".to_string(),
    };
    let identity = provider.sign_in_federated(&credential).await.unwrap();
    assert_eq!(identity.uid, "u2");
}

#[tokio::test]
async fn test_sign_out_clears_session_and_emits_event() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(account_ok("u1", "a@b.com"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut events = provider.subscribe().unwrap();

    provider.sign_in("a@b.com", "hunter22").await.unwrap();
    assert!(provider.current_identity().is_some());

    provider.sign_out().await.unwrap();
    assert!(provider.current_identity().is_none());

    assert!(matches!(
        events.recv().await.unwrap(),
        AuthEvent::SignedIn { .. }
    ));
    assert!(matches!(events.recv().await.unwrap(), AuthEvent::SignedOut));
}

#[tokio::test]
async fn test_update_profile_requires_session() {
    let server = MockServer::start().await;
    let provider = provider_for(&server);

    let err = provider
        .update_profile(&ProfileUpdate::display_name("Grace"))
        .await
        .unwrap_err();
    assert!(matches!(err, IdentityError::NotSignedIn));
}

#[tokio::test]
async fn test_update_profile_sends_token_and_merges_locally() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:signInWithPassword"))
        .respond_with(account_ok("u1", "a@b.com"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/accounts:update"))
        .and(body_partial_json(json!({
            "idToken": "token-u1",
            "displayName": "Grace",
        })))
        .respond_with(account_ok("u1", "a@b.com"))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    provider.sign_in("a@b.com", "hunter22").await.unwrap();

    provider
        .update_profile(&ProfileUpdate::display_name("Grace"))
        .await
        .unwrap();

    let identity = provider.current_identity().unwrap();
    assert_eq!(identity.display_name.as_deref(), Some("Grace"));
}
