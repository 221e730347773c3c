//! Authentication service for Cinema DB
//!
//! [`AuthManager`] wraps an [`AuthBackend`] (email/password identity
//! provider), keeps the signed-in user, and publishes an [`AuthState`]
//! stream that the root screen observes to pick its initial destination.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

/// Authentication error types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Wrong email or password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An account already exists for this email
    #[error("Email already in use")]
    EmailAlreadyInUse,

    /// Password rejected by the identity provider
    #[error("Weak password: {0}")]
    WeakPassword(String),

    /// Operation requires a signed-in user
    #[error("No signed in user")]
    NoSession,

    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// Any other identity provider error
    #[error("Auth service error: {0}")]
    Service(String),
}

/// Result type for authentication operations
pub type Result<T> = std::result::Result<T, AuthError>;

/// Authentication state observed by the root screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum AuthState {
    /// No user
    #[default]
    SignedOut,
    /// A user signed in with email and password
    SignedIn,
    /// An anonymous user
    Authenticated,
}

impl AuthState {
    /// Derive the state from the current user
    pub fn from_user(user: Option<&AuthUser>) -> Self {
        match user {
            Some(user) if user.is_anonymous => AuthState::Authenticated,
            Some(_) => AuthState::SignedIn,
            None => AuthState::SignedOut,
        }
    }

    /// Whether any user is present
    pub fn has_user(&self) -> bool {
        !matches!(self, AuthState::SignedOut)
    }
}

/// A user known to the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    /// Provider user id
    pub uid: String,
    /// Email address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the user signed in anonymously
    #[serde(default)]
    pub is_anonymous: bool,
}

/// Email/password identity provider
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Sign in an existing user
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Create a new user and sign it in
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser>;

    /// Sign out the current user
    async fn sign_out(&self) -> Result<()>;

    /// The user restored from a previous session, if any
    async fn current_user(&self) -> Option<AuthUser>;
}

/// Authentication manager
///
/// Every successful sign-in, sign-up or sign-out updates the published
/// [`AuthState`]. Failures are logged and returned; the state is left as is.
///
/// # Example
///
/// ```rust
/// use app_core::auth::{AuthManager, AuthState};
/// use app_core::test_utils::InMemoryAuthBackend;
/// use std::sync::Arc;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() {
///     let backend = Arc::new(InMemoryAuthBackend::new());
///     backend.add_user("alice@example.com", "secret1").await;
///
///     let auth = AuthManager::new(backend);
///     let mut states = auth.subscribe();
///
///     auth.sign_in("alice@example.com", "secret1").await.unwrap();
///     assert_eq!(*states.borrow_and_update(), AuthState::SignedIn);
/// }
/// ```
pub struct AuthManager {
    backend: Arc<dyn AuthBackend>,
    user: RwLock<Option<AuthUser>>,
    state: watch::Sender<AuthState>,
}

impl AuthManager {
    /// Create a manager over `backend`, starting signed out
    pub fn new(backend: Arc<dyn AuthBackend>) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            backend,
            user: RwLock::new(None),
            state,
        }
    }

    /// Pick up a user persisted by the backend from a previous session
    pub async fn restore(&self) -> AuthState {
        let user = self.backend.current_user().await;
        tracing::debug!("Auth restored: {}", user.is_some());
        self.update_state(user).await
    }

    /// Subscribe to auth state changes
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    /// Current auth state
    pub fn state(&self) -> AuthState {
        *self.state.borrow()
    }

    /// Current user
    pub async fn user(&self) -> Option<AuthUser> {
        self.user.read().await.clone()
    }

    /// Sign in with email and password
    ///
    /// # Errors
    ///
    /// - `AuthError::InvalidCredentials` - Unknown email or wrong password
    /// - `AuthError::Network` - Transport failure
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser> {
        match self.backend.sign_in(email, password).await {
            Ok(user) => {
                tracing::info!("Auth success: sign in, uid {}", user.uid);
                self.update_state(Some(user.clone())).await;
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("Auth failed to sign in: {}", e);
                Err(e)
            }
        }
    }

    /// Create an account with email and password
    ///
    /// # Errors
    ///
    /// - `AuthError::EmailAlreadyInUse` - Account exists
    /// - `AuthError::WeakPassword` - Password rejected
    /// - `AuthError::Network` - Transport failure
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser> {
        match self.backend.sign_up(email, password).await {
            Ok(user) => {
                tracing::info!("Auth success: sign up, uid {}", user.uid);
                self.update_state(Some(user.clone())).await;
                Ok(user)
            }
            Err(e) => {
                tracing::warn!("Auth failed to sign up: {}", e);
                Err(e)
            }
        }
    }

    /// Sign out the current user
    ///
    /// Does nothing when no user is signed in.
    pub async fn sign_out(&self) -> Result<()> {
        if self.user.read().await.is_none() {
            return Ok(());
        }

        if let Err(e) = self.backend.sign_out().await {
            tracing::error!("Auth failed to sign out: {}", e);
            return Err(e);
        }

        self.update_state(None).await;
        Ok(())
    }

    async fn update_state(&self, user: Option<AuthUser>) -> AuthState {
        let state = AuthState::from_user(user.as_ref());
        *self.user.write().await = user;
        self.state.send_replace(state);
        state
    }
}
