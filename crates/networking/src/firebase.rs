//! Firebase email/password authentication
//!
//! [`FirebaseAuth`] implements [`AuthBackend`] over the Identity Toolkit
//! REST API. The session lives in memory for the lifetime of the client.

use crate::client::{HttpClient, HttpClientConfig, HttpError};
use crate::retry::RetryConfig;
use app_core::auth::{AuthBackend, AuthError, AuthUser, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::RwLock;

/// Default Identity Toolkit base URL
pub const DEFAULT_BASE_URL: &str = "https://identitytoolkit.googleapis.com/v1";

impl From<HttpError> for AuthError {
    fn from(err: HttpError) -> Self {
        match err {
            HttpError::Status { message, .. } => auth_error_from_code(&message),
            HttpError::Network(_) | HttpError::Timeout => AuthError::Network(err.to_string()),
            other => AuthError::Service(other.to_string()),
        }
    }
}

/// Map an Identity Toolkit error code (e.g. `EMAIL_EXISTS`) to an error
fn auth_error_from_code(message: &str) -> AuthError {
    let code = message.split(':').next().unwrap_or(message).trim();
    match code {
        "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS" | "INVALID_EMAIL"
        | "USER_DISABLED" => AuthError::InvalidCredentials,
        "EMAIL_EXISTS" => AuthError::EmailAlreadyInUse,
        "WEAK_PASSWORD" => {
            let detail = message.split_once(':').map(|(_, detail)| detail.trim());
            AuthError::WeakPassword(detail.unwrap_or(code).to_string())
        }
        _ => AuthError::Service(message.to_string()),
    }
}

/// Firebase client configuration
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Identity Toolkit base URL
    pub base_url: String,
    /// Web API key of the project
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for FirebaseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl FirebaseConfig {
    /// Create a configuration with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    /// Set the base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PasswordResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    id_token: String,
}

/// The signed-in user and its ID token
#[derive(Debug, Clone)]
struct Session {
    user: AuthUser,
    id_token: String,
}

/// Identity provider backed by Firebase Authentication
pub struct FirebaseAuth {
    http: HttpClient,
    api_key: String,
    session: RwLock<Option<Session>>,
}

impl FirebaseAuth {
    /// Create a client
    ///
    /// Requests are never retried.
    ///
    /// # Errors
    ///
    /// - `HttpError::InvalidConfig` - The HTTP client could not be built
    pub fn new(config: FirebaseConfig) -> std::result::Result<Self, HttpError> {
        let http = HttpClient::new(
            HttpClientConfig::new(config.base_url)
                .with_timeout(config.timeout)
                .with_retry(RetryConfig::disabled()),
        )?;
        Ok(Self {
            http,
            api_key: config.api_key,
            session: RwLock::new(None),
        })
    }

    /// Whether a user is signed in
    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// ID token of the signed-in user, for calls to other Firebase services
    pub async fn id_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.id_token.clone())
    }

    async fn password_call(&self, endpoint: &str, email: &str, password: &str) -> Result<AuthUser> {
        let body = PasswordRequest {
            email,
            password,
            return_secure_token: true,
        };
        let query = [("key", self.api_key.clone())];
        let response: PasswordResponse = self.http.post_json(endpoint, &query, &body).await?;

        let user = AuthUser {
            uid: response.local_id,
            email: response.email.or_else(|| Some(email.to_string())),
            is_anonymous: false,
        };
        *self.session.write().await = Some(Session {
            user: user.clone(),
            id_token: response.id_token,
        });
        Ok(user)
    }
}

impl std::fmt::Debug for FirebaseAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseAuth")
            .field("base_url", &self.http.config().base_url)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl AuthBackend for FirebaseAuth {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.password_call("/accounts:signInWithPassword", email, password)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        self.password_call("/accounts:signUp", email, password).await
    }

    async fn sign_out(&self) -> Result<()> {
        *self.session.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Option<AuthUser> {
        self.session
            .read()
            .await
            .as_ref()
            .map(|session| session.user.clone())
    }
}
