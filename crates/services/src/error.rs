//! Shared error types for the services crate.

use thiserror::Error;

use guided_core::model::ProgressError;
use guided_core::walker::WalkError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by the REST API surface.
///
/// This is the client-side taxonomy: 401s are authentication failures
/// (bad credentials or a stale token), 400/422 carry the backend's
/// machine-readable validation reason, 404s are missing resources, and
/// everything transport-level lands in `Http`. Nothing is retried
/// automatically.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl ApiError {
    /// True for 401-class failures that must tear down the session.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }
}

/// Errors emitted by `SessionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("not authenticated")]
    NotAuthenticated,
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `CatalogService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressSyncError {
    #[error(transparent)]
    Walk(#[from] WalkError),
    #[error(transparent)]
    Record(#[from] ProgressError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}
