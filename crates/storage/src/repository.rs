use async_trait::async_trait;
use chrono::{DateTime, Utc};
use guided_core::model::AuthToken;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Persisted shape of the local session: the bearer token and when it was
/// stored.
///
/// This is the client-local analog of the browser's token slot. Presence of
/// a record is the sole startup signal for authenticated state; the token is
/// only known to be stale once the backend rejects it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub token: AuthToken,
    pub saved_at: DateTime<Utc>,
}

impl SessionRecord {
    #[must_use]
    pub fn new(token: AuthToken, saved_at: DateTime<Utc>) -> Self {
        Self { token, saved_at }
    }
}

/// Repository contract for the locally persisted session.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist or replace the session record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError>;

    /// Fetch the persisted session, if any.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures; a missing session is
    /// `Ok(None)`, not an error.
    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError>;

    /// Remove the persisted session. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be removed.
    async fn clear_session(&self) -> Result<(), StorageError>;
}

/// Simple in-memory session store for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    session: Arc<Mutex<Option<SessionRecord>>>,
}

impl InMemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: Arc::new(Mutex::new(None)),
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn save_session(&self, record: &SessionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = Some(record.clone());
        Ok(())
    }

    async fn load_session(&self) -> Result<Option<SessionRecord>, StorageError> {
        let guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn clear_session(&self) -> Result<(), StorageError> {
        let mut guard = self
            .session
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        *guard = None;
        Ok(())
    }
}

/// Aggregates local stores behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub sessions: Arc<dyn SessionStore>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
        Self { sessions }
    }
}
