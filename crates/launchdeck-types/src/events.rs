//! Auth state notifications pushed by the identity provider.

use serde::{Deserialize, Serialize};

use crate::user::Identity;

/// A state transition emitted by the identity provider.
///
/// Serializable so embedding applications can log or replay transitions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthEvent {
    /// A user signed in (or the provider restored an existing session).
    SignedIn { identity: Identity },

    /// The active session ended.
    SignedOut,
}

impl AuthEvent {
    pub fn signed_in(identity: Identity) -> Self {
        Self::SignedIn { identity }
    }
}
