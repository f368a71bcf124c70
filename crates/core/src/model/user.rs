use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TokenError {
    #[error("auth token cannot be empty")]
    Empty,
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// The authenticated user record as served by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_active: bool,
}

//
// ─── AUTH TOKEN ────────────────────────────────────────────────────────────────
//

/// Bearer token for authenticated API calls.
///
/// Presence of a token is the sole signal used to initialize authenticated
/// state at startup; validity is only discovered on the first rejected call.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken(String);

impl AuthToken {
    /// Creates a token from its wire representation.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Empty` for empty or whitespace-only input.
    pub fn new(raw: impl Into<String>) -> Result<Self, TokenError> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(TokenError::Empty);
        }
        Ok(Self(raw))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Never print token material in logs or panics.
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AuthToken(***)")
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
