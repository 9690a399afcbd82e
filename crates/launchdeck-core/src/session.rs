//! Session/role synchronizer.
//!
//! Bridges the identity provider's auth event stream to a role-aware
//! session value. The listener task is the only consumer of provider
//! events, so identity transitions are handled strictly in order; at most
//! one role resolution runs at a time, and at most one per distinct
//! identity. Consumers observe the session through a watch-backed store
//! (`subscribe`/`snapshot`) rather than a global singleton.

use std::sync::{Arc, Mutex};

use launchdeck_providers::identity::{
    AuthEvents, FederatedCredential, IdentityError, IdentityProvider,
};
use launchdeck_types::{AuthEvent, Identity, ProfileUpdate, Role, SessionUser};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::roles::{RoleClient, RoleError};

/// The session value exposed to the rest of the application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    /// The signed-in user, if any. While a role resolution is in flight the
    /// user is present with the default role and `loading` is still true.
    pub user: Option<SessionUser>,
    /// True from the moment a new identity is seen until its role
    /// resolution completes. UI gates rendering on this single flag.
    pub loading: bool,
}

impl SessionSnapshot {
    fn signed_out() -> Self {
        Self::default()
    }

    fn resolving(identity: Identity) -> Self {
        Self {
            user: Some(SessionUser::new(identity, Role::default())),
            loading: true,
        }
    }

    fn authenticated(user: SessionUser) -> Self {
        Self {
            user: Some(user),
            loading: false,
        }
    }

    /// True once a user is present and role resolution has finished.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && !self.loading
    }
}

/// Watch-backed store holding the current [`SessionSnapshot`].
#[derive(Debug)]
pub struct SessionStore {
    tx: watch::Sender<SessionSnapshot>,
}

impl SessionStore {
    fn new() -> Self {
        let (tx, _rx) = watch::channel(SessionSnapshot::signed_out());
        Self { tx }
    }

    /// Subscribes to session changes. Receivers see every committed
    /// transition from the point of subscription onward.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.tx.subscribe()
    }

    /// The current session value.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.tx.borrow().clone()
    }

    fn set(&self, snapshot: SessionSnapshot) {
        self.tx.send_replace(snapshot);
    }

    fn update_user(&self, f: impl FnOnce(&mut SessionUser)) {
        self.tx.send_if_modified(|snapshot| {
            if let Some(user) = snapshot.user.as_mut() {
                f(user);
                true
            } else {
                false
            }
        });
    }
}

/// Dedup and staleness tracking for role resolutions.
///
/// `last_uid` suppresses redundant resolutions for re-entrant signed-in
/// events (token refreshes). The generation counter makes any resolution
/// started before a sign-out or identity change commit-proof: a completion
/// under a stale generation is discarded, so a fast re-sign-in can never be
/// overwritten by a late response for the previous identity.
#[derive(Debug, Default)]
struct Guard {
    last_uid: Option<String>,
    generation: u64,
}

impl Guard {
    /// Accepts a signed-in identity unless it matches the last seen uid.
    /// Returns the generation under which its role resolution runs.
    fn accept(&mut self, uid: &str) -> Option<u64> {
        if self.last_uid.as_deref() == Some(uid) {
            return None;
        }
        self.last_uid = Some(uid.to_string());
        self.generation += 1;
        Some(self.generation)
    }

    /// Forgets the current identity and invalidates in-flight resolutions.
    fn reset(&mut self) {
        self.last_uid = None;
        self.generation += 1;
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }
}

/// The session/role synchronizer.
///
/// Construct one per application, call [`SessionSync::listen`] with the
/// provider's event stream, and hand clones of the store's receivers to
/// whatever needs the session.
pub struct SessionSync<P> {
    provider: P,
    roles: RoleClient,
    store: Arc<SessionStore>,
    guard: Arc<Mutex<Guard>>,
}

impl<P: IdentityProvider> SessionSync<P> {
    pub fn new(provider: P, roles: RoleClient) -> Self {
        Self {
            provider,
            roles,
            store: Arc::new(SessionStore::new()),
            guard: Arc::new(Mutex::new(Guard::default())),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.store.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.store.snapshot()
    }

    /// Spawns the listener task consuming the provider's event stream.
    ///
    /// The task ends when the provider side of the stream is dropped.
    pub fn listen(&self, mut events: AuthEvents) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let guard = Arc::clone(&self.guard);
        let roles = self.roles.clone();

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                match event {
                    AuthEvent::SignedIn { identity } => {
                        let accepted = guard
                            .lock()
                            .expect("session guard lock poisoned")
                            .accept(&identity.uid);
                        let Some(generation) = accepted else {
                            tracing::debug!(uid = %identity.uid, "re-entrant sign-in ignored");
                            continue;
                        };

                        store.set(SessionSnapshot::resolving(identity.clone()));
                        let role = resolve_role(&roles, &identity).await;

                        let current = guard
                            .lock()
                            .expect("session guard lock poisoned")
                            .is_current(generation);
                        if !current {
                            tracing::debug!(
                                uid = %identity.uid,
                                "discarding stale role resolution"
                            );
                            continue;
                        }
                        store.set(SessionSnapshot::authenticated(SessionUser::new(
                            identity, role,
                        )));
                    }
                    AuthEvent::SignedOut => {
                        guard.lock().expect("session guard lock poisoned").reset();
                        store.set(SessionSnapshot::signed_out());
                    }
                }
            }
            tracing::debug!("auth event stream closed; session listener exiting");
        })
    }

    /// Registers a new account. The backend role record is *not* created
    /// here; it is provisioned lazily by the first role fetch.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        self.provider.sign_up(email, password).await
    }

    /// Signs in with email and password. Role resolution happens through
    /// the listener, not synchronously here.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Identity, IdentityError> {
        self.provider.sign_in(email, password).await
    }

    /// Signs in with a federated OAuth credential. Same pattern as
    /// [`SessionSync::sign_in`].
    pub async fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> Result<Identity, IdentityError> {
        self.provider.sign_in_federated(credential).await
    }

    /// Signs out. Local session state is cleared unconditionally, even when
    /// the provider call fails; we fail open to the logged-out state.
    pub async fn sign_out(&self) -> Result<(), IdentityError> {
        let result = self.provider.sign_out().await;

        self.guard
            .lock()
            .expect("session guard lock poisoned")
            .reset();
        self.store.set(SessionSnapshot::signed_out());

        if let Err(err) = &result {
            tracing::warn!(error = %err, "provider sign-out failed; local session cleared anyway");
        }
        result
    }

    /// Updates the provider-side profile and merges the fields into the
    /// in-memory session user. The role is never touched and no server-side
    /// role state is re-validated.
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<(), IdentityError> {
        self.provider.update_profile(update).await?;
        self.store.update_user(|user| user.apply(update));
        Ok(())
    }
}

/// Resolves the role for a newly seen identity. Exactly one call per
/// accepted identity; never fails.
///
/// Lookup miss provisions a default record; any other failure degrades to
/// the default role locally. The UI must never block indefinitely on a
/// flaky role service, so availability wins over consistency here.
async fn resolve_role(roles: &RoleClient, identity: &Identity) -> Role {
    match roles.fetch_by_email(&identity.email).await {
        Ok(record) => record.role,
        Err(RoleError::NotFound) => {
            match roles
                .provision(&identity.email, identity.display_name.as_deref())
                .await
            {
                Ok(record) => record.role,
                Err(err) => {
                    tracing::warn!(
                        email = %identity.email,
                        error = %err,
                        "role provisioning failed; defaulting to user"
                    );
                    Role::User
                }
            }
        }
        Err(err) => {
            tracing::warn!(
                email = %identity.email,
                error = %err,
                "role lookup failed; defaulting to user"
            );
            Role::User
        }
    }
}
