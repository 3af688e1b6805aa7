//! Session ownership.
//!
//! `AuthStore` is the only writer of the session. Everything else holds a
//! [`SessionReader`], which can answer "who is logged in" and hand out the
//! bearer token but cannot change either.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::instrument;

use barberbook_core::{Email, EmailError, User};

use crate::api::{ApiError, AuthApi, AuthResponse, LoginRequest, RegisterRequest};
use crate::error::{ErrorPayload, clear_sentry_user, set_sentry_user};
use crate::persist::{AUTH_KEY, DurableSlice, KeyValueStore};

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl AuthError {
    #[must_use]
    pub fn payload(&self) -> ErrorPayload {
        match self {
            Self::InvalidEmail(e) => ErrorPayload::new("INVALID_EMAIL", e.to_string()),
            Self::Api(e) => e.payload(),
        }
    }
}

/// Who is using the client right now.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { user: User, token: SecretString },
}

impl AuthState {
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated { .. })
    }

    #[must_use]
    pub const fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated { user, .. } => Some(user),
            Self::Anonymous => None,
        }
    }
}

/// Persisted form of an authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredSession {
    user: User,
    token: String,
}

impl From<StoredSession> for AuthState {
    fn from(stored: StoredSession) -> Self {
        Self::Authenticated {
            user: stored.user,
            token: SecretString::from(stored.token),
        }
    }
}

/// Read-only view of the session.
#[derive(Debug, Clone)]
pub struct SessionReader {
    state: Arc<RwLock<AuthState>>,
    generation: Arc<AtomicU64>,
}

impl SessionReader {
    /// Generation of the current session, or `None` when anonymous.
    ///
    /// Bumped on every login, registration and logout, so data fetched
    /// under one session can be told apart from data of the next.
    pub async fn generation(&self) -> Option<u64> {
        let state = self.state.read().await;
        state
            .is_authenticated()
            .then(|| self.generation.load(Ordering::Acquire))
    }

    /// Bearer token together with the generation it belongs to.
    pub(crate) async fn token_and_generation(&self) -> Option<(SecretString, u64)> {
        match &*self.state.read().await {
            AuthState::Authenticated { token, .. } => {
                Some((token.clone(), self.generation.load(Ordering::Acquire)))
            }
            AuthState::Anonymous => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.state.read().await.is_authenticated()
    }

    /// Bearer token of the current session.
    pub async fn token(&self) -> Option<SecretString> {
        match &*self.state.read().await {
            AuthState::Authenticated { token, .. } => Some(token.clone()),
            AuthState::Anonymous => None,
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.state.read().await.user().cloned()
    }
}

/// Owner of the session: login, registration, logout and refresh.
pub struct AuthStore<A, S> {
    api: A,
    state: Arc<RwLock<AuthState>>,
    generation: Arc<AtomicU64>,
    session: Mutex<DurableSlice<Option<StoredSession>, S>>,
}

impl<A, S> std::fmt::Debug for AuthStore<A, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthStore").finish_non_exhaustive()
    }
}

impl<A: AuthApi, S: KeyValueStore> AuthStore<A, S> {
    /// Restore the session persisted in `store`, if any.
    pub fn load(api: A, store: S) -> Self {
        let session: DurableSlice<Option<StoredSession>, S> = DurableSlice::load(store, AUTH_KEY);
        let state = session
            .get()
            .clone()
            .map_or_else(AuthState::default, AuthState::from);
        if let Some(user) = state.user() {
            tracing::debug!(user_id = %user.id, "Session restored");
        }
        Self {
            api,
            state: Arc::new(RwLock::new(state)),
            generation: Arc::new(AtomicU64::new(0)),
            session: Mutex::new(session),
        }
    }

    /// Handle for components that only need to read the session.
    #[must_use]
    pub fn reader(&self) -> SessionReader {
        SessionReader {
            state: Arc::clone(&self.state),
            generation: Arc::clone(&self.generation),
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` without a network call when the
    /// email is malformed, or `AuthError::Api` when the backend rejects the
    /// credentials. The previous session is kept on failure.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: SecretString) -> Result<User, AuthError> {
        let request = LoginRequest {
            email: Email::parse(email)?,
            password,
        };
        let response = self.api.login(&request).await?;
        Ok(self.establish(response).await)
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` without a network call when the
    /// email is malformed, or `AuthError::Api` when registration fails.
    #[instrument(skip(self, phone, password))]
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        phone: &str,
        password: SecretString,
    ) -> Result<User, AuthError> {
        let request = RegisterRequest {
            name: name.trim().to_string(),
            email: Email::parse(email)?,
            phone: phone.trim().to_string(),
            password,
        };
        let response = self.api.register(&request).await?;
        Ok(self.establish(response).await)
    }

    /// End the session on the backend, then locally.
    ///
    /// A `401` answer means the backend already forgot the session, so it
    /// counts as success.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for network or server failures; the session
    /// is kept in that case.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> Result<(), AuthError> {
        let Some(token) = self.reader().token().await else {
            return Ok(());
        };

        match self.api.logout(&token).await {
            Ok(()) | Err(ApiError::Unauthorized(_)) => {}
            Err(e) => return Err(e.into()),
        }

        self.end_session().await;
        tracing::info!("Logged out");
        Ok(())
    }

    /// Re-validate the stored token with `GET /auth/me`.
    ///
    /// Returns the fresh user, or `None` when there is no session or the
    /// backend no longer accepts the token (the session is then dropped).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Api` for network or server failures; the session
    /// is left as it was.
    #[instrument(skip(self))]
    pub async fn refresh_session(&self) -> Result<Option<User>, AuthError> {
        let Some(token) = self.reader().token().await else {
            return Ok(None);
        };

        match self.api.current_user(&token).await {
            Ok(user) => {
                let mut state = self.state.write().await;
                *state = AuthState::Authenticated {
                    user: user.clone(),
                    token: token.clone(),
                };
                self.session.lock().await.set(Some(StoredSession {
                    user: user.clone(),
                    token: token.expose_secret().to_string(),
                }));
                Ok(Some(user))
            }
            Err(ApiError::Unauthorized(reason)) => {
                tracing::warn!(%reason, "Session rejected by backend");
                self.end_session().await;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn current_user(&self) -> Option<User> {
        self.reader().current_user().await
    }

    pub async fn is_authenticated(&self) -> bool {
        self.reader().is_authenticated().await
    }

    pub async fn token(&self) -> Option<SecretString> {
        self.reader().token().await
    }

    async fn establish(&self, response: AuthResponse) -> User {
        let AuthResponse { token, user } = response;
        set_sentry_user(&user.id, Some(user.email.as_str()));

        let mut state = self.state.write().await;
        self.session.lock().await.set(Some(StoredSession {
            user: user.clone(),
            token: token.clone(),
        }));
        *state = AuthState::Authenticated {
            user: user.clone(),
            token: SecretString::from(token),
        };
        self.generation.fetch_add(1, Ordering::AcqRel);
        tracing::info!(user_id = %user.id, "Session established");
        user
    }

    async fn end_session(&self) {
        let mut state = self.state.write().await;
        self.session.lock().await.clear();
        *state = AuthState::Anonymous;
        self.generation.fetch_add(1, Ordering::AcqRel);
        clear_sentry_user();
    }
}
