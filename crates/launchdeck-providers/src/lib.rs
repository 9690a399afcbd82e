//! Clients for the external managed services Launchdeck delegates to.
//!
//! Authentication, payments and image hosting are all owned by third
//! parties; this crate holds the thin typed clients for each boundary.
//! The session logic that consumes the identity provider lives in
//! `launchdeck-core`.

pub mod identity;
pub mod images;
pub mod payments;
