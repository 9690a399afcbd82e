//! Client for the backend role service.
//!
//! Roles are server-owned: the identity provider knows nothing about them.
//! The synchronizer looks records up by email and lazily provisions a
//! default record for identities the backend has never seen.

use launchdeck_types::Role;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Errors from the role service.
///
/// `NotFound` is its own variant because the synchronizer treats it as "go
/// provision" rather than as a failure.
#[derive(Debug, thiserror::Error)]
pub enum RoleError {
    #[error("no role record for this email")]
    NotFound,

    #[error("role service returned HTTP {0}")]
    Http(StatusCode),

    #[error("role service request failed")]
    Network(#[from] reqwest::Error),
}

/// A backend role record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

#[derive(Debug, Deserialize)]
struct UserEnvelope {
    #[allow(dead_code)]
    success: bool,
    user: RoleRecord,
}

/// Client for the role endpoints of the marketplace backend.
#[derive(Debug, Clone)]
pub struct RoleClient {
    base_url: String,
    http: reqwest::Client,
}

impl RoleClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// Fetches the role record for an email. A backend 404 maps to
    /// [`RoleError::NotFound`].
    pub async fn fetch_by_email(&self, email: &str) -> Result<RoleRecord, RoleError> {
        let response = self
            .http
            .get(format!("{}/users/by-email/{email}", self.base_url))
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(RoleError::NotFound),
            status if status.is_success() => {
                let envelope: UserEnvelope = response.json().await?;
                Ok(envelope.user)
            }
            status => Err(RoleError::Http(status)),
        }
    }

    /// Creates (or updates) the role record for an email with the default
    /// `user` role.
    pub async fn provision(
        &self,
        email: &str,
        name: Option<&str>,
    ) -> Result<RoleRecord, RoleError> {
        let body = json!({
            "email": email,
            "name": name,
            "role": Role::User,
        });
        let response = self
            .http
            .put(format!("{}/users/email/{email}", self.base_url))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RoleError::Http(status));
        }
        let envelope: UserEnvelope = response.json().await?;
        Ok(envelope.user)
    }
}
