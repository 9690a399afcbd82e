//! Core of the Launchdeck client SDK.
//!
//! Owns the session/role synchronizer (the bridge between the identity
//! provider's event stream and a role-aware session store) plus the typed
//! clients for the marketplace backend. External managed services are
//! reached through `launchdeck-providers`.

pub mod api;
pub mod config;
pub mod logging;
pub mod roles;
pub mod session;

pub use config::Config;
pub use session::{SessionSnapshot, SessionStore, SessionSync};
