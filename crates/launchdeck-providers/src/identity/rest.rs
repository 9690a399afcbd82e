//! REST implementation of the identity provider boundary.
//!
//! Speaks the Identity Toolkit wire shape: `accounts:signUp`,
//! `accounts:signInWithPassword`, `accounts:signInWithIdp` and
//! `accounts:update`, all keyed by an API-key query parameter. Provider
//! error codes (`EMAIL_EXISTS`, `WEAK_PASSWORD`, ...) are mapped into the
//! [`IdentityError`] taxonomy.

use std::sync::Mutex;

use launchdeck_types::{Identity, ProfileUpdate};
use serde::Deserialize;
use serde_json::json;

use super::{
    AuthEventSender, AuthEvents, FederatedCredential, IdentityError, IdentityProvider,
};

/// Default base URL for the hosted identity service.
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com";

/// Configuration for [`RestIdentityProvider`].
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Project API key appended to every request.
    pub api_key: String,
    pub base_url: String,
}

impl IdentityConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// The signed-in session as the provider sees it.
#[derive(Debug, Clone)]
struct CurrentSession {
    id_token: String,
    identity: Identity,
}

/// Identity provider backed by a hosted REST auth service.
pub struct RestIdentityProvider {
    config: IdentityConfig,
    http: reqwest::Client,
    events: AuthEventSender,
    subscription: Mutex<Option<AuthEvents>>,
    current: Mutex<Option<CurrentSession>>,
}

impl RestIdentityProvider {
    /// Creates a provider with the given configuration.
    ///
    /// # Panics
    /// - In test builds, panics if `base_url` is the production service.
    /// - At runtime, panics if `LAUNCHDECK_BLOCK_REAL_API=1` and `base_url`
    ///   is the production service.
    ///
    /// This prevents tests from accidentally making real network requests.
    pub fn new(config: IdentityConfig) -> Self {
        #[cfg(test)]
        assert_ne!(
            config.base_url, DEFAULT_BASE_URL,
            "tests must point the identity provider at a mock server"
        );

        #[cfg(not(test))]
        if std::env::var("LAUNCHDECK_BLOCK_REAL_API").is_ok_and(|v| v == "1")
            && config.base_url == DEFAULT_BASE_URL
        {
            panic!(
                "LAUNCHDECK_BLOCK_REAL_API=1 but the identity provider points at {}",
                config.base_url
            );
        }

        let (events, stream) = AuthEvents::channel();
        Self {
            config,
            http: reqwest::Client::new(),
            events,
            subscription: Mutex::new(Some(stream)),
            current: Mutex::new(None),
        }
    }

    /// The identity of the signed-in user, if any.
    pub fn current_identity(&self) -> Option<Identity> {
        self.current
            .lock()
            .expect("identity session lock poisoned")
            .as_ref()
            .map(|s| s.identity.clone())
    }

    fn account_url(&self, action: &str) -> String {
        format!(
            "{}/v1/accounts:{}?key={}",
            self.config.base_url, action, self.config.api_key
        )
    }

    /// Posts to an account endpoint, mapping provider error codes into the
    /// taxonomy. Returns the raw response for endpoints whose body varies.
    async fn post_account_raw(
        &self,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, IdentityError> {
        let response = self
            .http
            .post(self.account_url(action))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match response.json::<ErrorEnvelope>().await {
            Ok(envelope) => Err(map_provider_code(&envelope.error.message)),
            Err(_) => Err(IdentityError::Provider(format!(
                "unexpected HTTP {status} from accounts:{action}"
            ))),
        }
    }

    async fn post_account(
        &self,
        action: &str,
        body: &serde_json::Value,
    ) -> Result<AccountResponse, IdentityError> {
        Ok(self.post_account_raw(action, body).await?.json().await?)
    }

    /// Records the new session and notifies the event stream.
    fn establish(&self, response: AccountResponse) -> Identity {
        let identity = response.identity();
        *self
            .current
            .lock()
            .expect("identity session lock poisoned") = Some(CurrentSession {
            id_token: response.id_token,
            identity: identity.clone(),
        });
        self.events.signed_in(identity.clone());
        identity
    }
}

impl IdentityProvider for RestIdentityProvider {
    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send {
        async move {
            let body = json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            });
            let response = self.post_account("signUp", &body).await?;
            Ok(self.establish(response))
        }
    }

    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send {
        async move {
            let body = json!({
                "email": email,
                "password": password,
                "returnSecureToken": true,
            });
            let response = self.post_account("signInWithPassword", &body).await?;
            Ok(self.establish(response))
        }
    }

    fn sign_in_federated(
        &self,
        credential: &FederatedCredential,
    ) -> impl Future<Output = Result<Identity, IdentityError>> + Send {
        async move {
            let body = json!({
                "postBody": format!(
                    "access_token={}&providerId={}",
                    credential.access_token, credential.provider_id
                ),
                "requestUri": "http://localhost",
                "returnSecureToken": true,
                "returnIdpCredential": true,
            });
            let response = self.post_account("signInWithIdp", &body).await?;
            Ok(self.establish(response))
        }
    }

    fn sign_out(&self) -> impl Future<Output = Result<(), IdentityError>> + Send {
        async move {
            // Token revocation is provider-side; ending the session is a
            // local operation that always succeeds.
            *self
                .current
                .lock()
                .expect("identity session lock poisoned") = None;
            self.events.signed_out();
            Ok(())
        }
    }

    fn update_profile(
        &self,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), IdentityError>> + Send {
        async move {
            let id_token = self
                .current
                .lock()
                .expect("identity session lock poisoned")
                .as_ref()
                .map(|s| s.id_token.clone())
                .ok_or(IdentityError::NotSignedIn)?;

            let mut body = json!({
                "idToken": id_token,
                "returnSecureToken": false,
            });
            if let Some(name) = &update.display_name {
                body["displayName"] = json!(name);
            }
            if let Some(url) = &update.photo_url {
                body["photoUrl"] = json!(url);
            }

            // The update response omits the id token when no new token is
            // requested, so only the status and error mapping matter here.
            self.post_account_raw("update", &body).await?;

            let mut current = self
                .current
                .lock()
                .expect("identity session lock poisoned");
            if let Some(session) = current.as_mut() {
                if let Some(name) = &update.display_name {
                    session.identity.display_name = Some(name.clone());
                }
                if let Some(url) = &update.photo_url {
                    session.identity.photo_url = Some(url.clone());
                }
            }
            Ok(())
        }
    }

    fn subscribe(&self) -> Result<AuthEvents, IdentityError> {
        self.subscription
            .lock()
            .expect("identity subscription lock poisoned")
            .take()
            .ok_or(IdentityError::AlreadySubscribed)
    }
}

/// Common shape of the account endpoints' success responses.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountResponse {
    local_id: String,
    email: String,
    id_token: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
}

impl AccountResponse {
    fn identity(&self) -> Identity {
        Identity {
            uid: self.local_id.clone(),
            email: self.email.clone(),
            display_name: self.display_name.clone().filter(|s| !s.is_empty()),
            photo_url: self.photo_url.clone().filter(|s| !s.is_empty()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Maps a provider error code to the typed taxonomy.
///
/// Codes sometimes arrive with a trailing explanation
/// (`"WEAK_PASSWORD : Password should be at least 6 characters"`), so only
/// the leading token is matched.
fn map_provider_code(message: &str) -> IdentityError {
    let code = message.split([' ', ':']).next().unwrap_or(message);
    match code {
        "EMAIL_EXISTS" => IdentityError::EmailAlreadyInUse,
        "WEAK_PASSWORD" => IdentityError::WeakPassword,
        "INVALID_EMAIL" | "MISSING_EMAIL" => IdentityError::InvalidEmail,
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" => {
            IdentityError::InvalidCredentials
        }
        "USER_DISABLED" => IdentityError::UserDisabled,
        _ => IdentityError::Provider(message.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_mapping() {
        assert!(matches!(
            map_provider_code("EMAIL_EXISTS"),
            IdentityError::EmailAlreadyInUse
        ));
        assert!(matches!(
            map_provider_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            IdentityError::WeakPassword
        ));
        assert!(matches!(
            map_provider_code("INVALID_LOGIN_CREDENTIALS"),
            IdentityError::InvalidCredentials
        ));
        assert!(matches!(
            map_provider_code("SOMETHING_NEW"),
            IdentityError::Provider(_)
        ));
    }

    #[test]
    fn test_account_response_empty_strings_become_none() {
        let response: AccountResponse = serde_json::from_str(
            r#"{"localId":"u1","email":"a@b.com","idToken":"t","displayName":"","photoUrl":""}"#,
        )
        .unwrap();
        let identity = response.identity();
        assert_eq!(identity.display_name, None);
        assert_eq!(identity.photo_url, None);
    }

    #[test]
    fn test_subscribe_is_single_use() {
        let provider = RestIdentityProvider::new(
            IdentityConfig::new("k").with_base_url("http://127.0.0.1:1"),
        );
        assert!(provider.subscribe().is_ok());
        assert!(matches!(
            provider.subscribe(),
            Err(IdentityError::AlreadySubscribed)
        ));
    }
}
