//! Session store: the auth token and authenticated-user record, with the
//! lifecycle `init (load persisted token) → authenticated ⇄ anonymous →
//! logout (explicit clear)`.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use guided_core::Clock;
use guided_core::model::{AuthToken, User};
use storage::repository::{SessionRecord, SessionStore};

use crate::api::{NewUser, PlatformApi};
use crate::error::{ApiError, SessionError};

/// Snapshot of the session slice, cheap to clone for presentation reads.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    pub token: Option<AuthToken>,
    pub user: Option<User>,
    pub authenticated: bool,
}

/// Owns the auth slice and the persisted token.
///
/// Presence of a stored token is the sole startup signal for authenticated
/// state; staleness is only discovered when the backend rejects a call, at
/// which point the session is invalidated and the user must log in again.
pub struct SessionService {
    api: Arc<dyn PlatformApi>,
    store: Arc<dyn SessionStore>,
    clock: Clock,
    state: RwLock<AuthState>,
}

impl SessionService {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>, store: Arc<dyn SessionStore>, clock: Clock) -> Self {
        Self {
            api,
            store,
            clock,
            state: RwLock::new(AuthState::default()),
        }
    }

    /// Load the persisted token, if any, and mark the session authenticated
    /// on its presence alone. Returns whether a session was restored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the session slot cannot be read.
    pub async fn init(&self) -> Result<bool, SessionError> {
        let restored = self.store.load_session().await?;
        let mut state = self.state.write().await;
        match restored {
            Some(record) => {
                debug!("restored persisted session");
                state.token = Some(record.token);
                state.authenticated = true;
                state.user = None;
                Ok(true)
            }
            None => {
                *state = AuthState::default();
                Ok(false)
            }
        }
    }

    /// Exchange credentials for a token, persist it, then fetch the user
    /// record.
    ///
    /// On a rejected login nothing is stored and the state stays anonymous.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` for bad credentials or transport
    /// failures, `SessionError::Storage` if the token cannot be persisted.
    pub async fn login(&self, username: &str, password: &str) -> Result<User, SessionError> {
        let token = self.api.login(username, password).await?;

        self.store
            .save_session(&SessionRecord::new(token.clone(), self.clock.now()))
            .await?;
        {
            let mut state = self.state.write().await;
            state.token = Some(token.clone());
            state.authenticated = true;
        }

        let user = match self.api.current_user(&token).await {
            Ok(user) => user,
            Err(err) => {
                if err.is_authentication() {
                    self.invalidate().await?;
                }
                return Err(err.into());
            }
        };

        let mut state = self.state.write().await;
        state.user = Some(user.clone());
        Ok(user)
    }

    /// Create an account. Does not log in; no token is stored.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Api` carrying the backend's validation reason
    /// on duplicate username or email.
    pub async fn register(&self, new_user: &NewUser) -> Result<User, SessionError> {
        Ok(self.api.register(new_user).await?)
    }

    /// Re-fetch the authenticated user record with the stored token.
    ///
    /// A rejected token tears the session down before the error is
    /// returned.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` without a token,
    /// `SessionError::Api` on backend rejection.
    pub async fn refresh_user(&self) -> Result<User, SessionError> {
        let token = self.require_token().await?;
        match self.api.current_user(&token).await {
            Ok(user) => {
                let mut state = self.state.write().await;
                state.user = Some(user.clone());
                Ok(user)
            }
            Err(err) => {
                if err.is_authentication() {
                    self.invalidate().await?;
                }
                Err(err.into())
            }
        }
    }

    /// Tear the session down after the backend rejected its token.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the persisted slot cannot be
    /// cleared.
    pub async fn invalidate(&self) -> Result<(), SessionError> {
        warn!("session token rejected; clearing session");
        self.clear().await
    }

    /// Explicit logout.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` if the persisted slot cannot be
    /// cleared.
    pub async fn logout(&self) -> Result<(), SessionError> {
        debug!("logging out");
        self.clear().await
    }

    async fn clear(&self) -> Result<(), SessionError> {
        self.store.clear_session().await?;
        let mut state = self.state.write().await;
        *state = AuthState::default();
        Ok(())
    }

    /// The stored token, or `NotAuthenticated`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotAuthenticated` when no token is held.
    pub async fn require_token(&self) -> Result<AuthToken, SessionError> {
        self.state
            .read()
            .await
            .token
            .clone()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Snapshot of the auth slice.
    pub async fn state(&self) -> AuthState {
        self.state.read().await.clone()
    }

    /// Invalidate the session if the given error is a 401, then convert it.
    ///
    /// Shared by the other stores so any authenticated call can force
    /// re-login on a stale token.
    pub(crate) async fn note_api_error(&self, err: &ApiError) {
        if err.is_authentication() {
            // A failed clear leaves only in-memory state; the next init
            // retries the storage slot.
            if let Err(clear_err) = self.invalidate().await {
                warn!("failed to clear rejected session: {clear_err}");
            }
        }
    }
}
