//! Shared domain types for the Launchdeck client SDK.
//!
//! Everything here is plain data: identities and roles as the session layer
//! sees them, the catalog DTOs the marketplace API returns, and the payment
//! shapes the checkout flow passes around. No I/O lives in this crate.

pub mod catalog;
pub mod events;
pub mod payments;
pub mod user;

pub use events::AuthEvent;
pub use user::{Identity, ProfileUpdate, Role, SessionUser};
