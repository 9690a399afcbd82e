//! Identity provider boundary.
//!
//! The provider owns sign-up, sign-in (password and federated), sign-out and
//! profile mutation, and pushes [`AuthEvent`]s whenever the session state
//! changes. Role resolution is deliberately *not* part of this boundary; the
//! session synchronizer in `launchdeck-core` reconciles roles with the
//! marketplace backend.

use std::future::Future;

use launchdeck_types::{AuthEvent, Identity, ProfileUpdate};
use tokio::sync::mpsc;

mod rest;

pub use rest::{DEFAULT_BASE_URL, IdentityConfig, RestIdentityProvider};

/// Errors surfaced by an identity provider.
///
/// Call sites map these to user-facing notifications; none of them are
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("email is already in use")]
    EmailAlreadyInUse,

    #[error("password does not meet the provider's strength requirements")]
    WeakPassword,

    #[error("email address is malformed")]
    InvalidEmail,

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("this account has been disabled")]
    UserDisabled,

    #[error("no active session")]
    NotSignedIn,

    #[error("the auth event stream has already been subscribed")]
    AlreadySubscribed,

    #[error("identity provider request failed")]
    Network(#[from] reqwest::Error),

    #[error("identity provider rejected the request: {0}")]
    Provider(String),
}

/// An OAuth credential obtained out-of-band from a federated provider
/// (the embedding application runs the consent flow and hands us the token).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FederatedCredential {
    /// Provider id, e.g. `google.com`.
    pub provider_id: String,
    /// The provider's OAuth access token.
    pub access_token: String,
}

/// Sending half of the auth event stream, held by provider implementations.
#[derive(Debug, Clone)]
pub struct AuthEventSender {
    tx: mpsc::UnboundedSender<AuthEvent>,
}

impl AuthEventSender {
    pub fn signed_in(&self, identity: Identity) {
        self.emit(AuthEvent::signed_in(identity));
    }

    pub fn signed_out(&self) {
        self.emit(AuthEvent::SignedOut);
    }

    fn emit(&self, event: AuthEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("auth event dropped: no active subscription");
        }
    }
}

/// Receiving half of the auth event stream.
///
/// There is at most one of these per application lifetime; dropping it tears
/// the subscription down.
#[derive(Debug)]
pub struct AuthEvents {
    rx: mpsc::UnboundedReceiver<AuthEvent>,
}

impl AuthEvents {
    /// Creates a connected sender/receiver pair. Provider implementations
    /// keep the sender and hand the receiver out through `subscribe`.
    pub fn channel() -> (AuthEventSender, AuthEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (AuthEventSender { tx }, AuthEvents { rx })
    }

    /// Receives the next auth event, or `None` once the provider is gone.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.rx.recv().await
    }
}

/// Operations every identity provider must offer.
///
/// Futures are `Send` so callers are free to drive these from spawned tasks.
pub trait IdentityProvider: Send + Sync {
    /// Registers a new account and signs it in.
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Signs in with email and password.
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Signs in by exchanging a federated OAuth credential.
    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send;

    /// Ends the active session, if any.
    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Mutates the provider-side profile of the signed-in user.
    fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send;

    /// Hands out the auth event stream. At most one subscription exists per
    /// provider; later calls fail with [`IdentityError::AlreadySubscribed`].
    fn subscribe(&self) -> Result<AuthEvents, IdentityError>;
}
