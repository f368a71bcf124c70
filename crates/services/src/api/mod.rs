//! The REST surface of the learning platform backend.
//!
//! `PlatformApi` is the seam between the stores and the wire: `HttpApi`
//! talks JSON over HTTPS to the real backend, `InMemoryApi` reproduces the
//! backend's observable semantics for tests.

use std::env;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use guided_core::model::{
    AuthToken, Hint, Problem, ProblemError, ProblemId, ProgressRecord, Step, User, UserId,
};

use crate::error::ApiError;

mod fake;
mod http;

pub use fake::InMemoryApi;
pub use http::HttpApi;

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads the backend location from `GUIDED_API_URL`, falling back to the
    /// local development server.
    #[must_use]
    pub fn from_env() -> Self {
        let base_url =
            env::var("GUIDED_API_URL").unwrap_or_else(|_| "http://localhost:8000".into());
        Self { base_url }
    }

    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

//
// ─── REQUEST SHAPES ────────────────────────────────────────────────────────────
//

/// Registration payload for `POST /api/v1/auth/register`.
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Pagination window for the problem list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ProblemPage {
    pub skip: u32,
    pub limit: u32,
}

impl Default for ProblemPage {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// Partial-record body for `PUT /api/v1/progress/{problem_id}`.
///
/// The endpoint upserts: the first write for a (user, problem) pair creates
/// the record. Absent fields are left untouched server-side.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ProgressUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_step: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hints_used: Option<u32>,
}

impl ProgressUpdate {
    /// A full write of every mutable field, so the persisted record equals
    /// the walker's output exactly.
    #[must_use]
    pub fn from_record(record: &ProgressRecord) -> Self {
        Self {
            current_step: Some(record.current_step),
            completed: Some(record.completed),
            hints_used: Some(record.hints_used),
        }
    }
}

//
// ─── API CONTRACT ──────────────────────────────────────────────────────────────
//

/// Everything the client asks of the backend, bearer-token authenticated
/// where the backend requires it.
#[async_trait]
pub trait PlatformApi: Send + Sync {
    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Authentication` on bad credentials.
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError>;

    /// Create an account. Does not log the user in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` with the backend reason on duplicate
    /// username or email.
    async fn register(&self, new_user: &NewUser) -> Result<User, ApiError>;

    /// Fetch the authenticated user record.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Authentication` if the token is invalid or
    /// expired; the caller must treat that as "log the session out".
    async fn current_user(&self, token: &AuthToken) -> Result<User, ApiError>;

    /// Fetch a page of the problem catalog.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` on transport or decode failures.
    async fn list_problems(&self, page: ProblemPage) -> Result<Vec<Problem>, ApiError>;

    /// Fetch one problem with steps, hints, and solution.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for an unknown id.
    async fn get_problem(&self, id: ProblemId) -> Result<Problem, ApiError>;

    /// Fetch every progress record belonging to the caller.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Authentication` for a rejected token.
    async fn list_progress(&self, token: &AuthToken) -> Result<Vec<ProgressRecord>, ApiError>;

    /// Fetch the caller's record for one problem.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when the problem was never started.
    async fn get_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
    ) -> Result<ProgressRecord, ApiError>;

    /// Upsert the caller's record for one problem and return the stored
    /// state.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Authentication` for a rejected token, or other
    /// `ApiError` values on transport failure.
    async fn update_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
        update: &ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError>;
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[allow(dead_code)]
    pub token_type: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserDto {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub(crate) struct StepDto {
    pub order: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HintDto {
    pub order: i64,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProblemDto {
    pub id: i64,
    pub title: String,
    pub subject: String,
    pub difficulty: i64,
    pub description: String,
    pub solution: String,
    #[serde(default)]
    pub steps: Vec<StepDto>,
    #[serde(default)]
    pub hints: Vec<HintDto>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProgressDto {
    pub problem_id: i64,
    #[serde(default)]
    pub current_step: i64,
    #[serde(default)]
    pub hints_used: i64,
    #[serde(default)]
    pub completed: bool,
}

fn id_from_wire(raw: i64, what: &str) -> Result<u64, ApiError> {
    u64::try_from(raw).map_err(|_| ApiError::Decode(format!("negative {what}: {raw}")))
}

fn count_from_wire(raw: i64, what: &str) -> Result<u32, ApiError> {
    u32::try_from(raw).map_err(|_| ApiError::Decode(format!("bad {what}: {raw}")))
}

impl UserDto {
    pub(crate) fn into_domain(self) -> Result<User, ApiError> {
        Ok(User {
            id: UserId::new(id_from_wire(self.id, "user id")?),
            username: self.username,
            email: self.email,
            is_active: self.is_active,
        })
    }
}

impl ProblemDto {
    /// Steps and hints arrive with an explicit `order` column; the domain
    /// sequence index is the ordinal, so sort before converting.
    pub(crate) fn into_domain(mut self) -> Result<Problem, ApiError> {
        let id = ProblemId::new(id_from_wire(self.id, "problem id")?);
        let difficulty = u8::try_from(self.difficulty)
            .map_err(|_| ApiError::Decode(format!("bad difficulty: {}", self.difficulty)))?;

        self.steps.sort_by_key(|s| s.order);
        self.hints.sort_by_key(|h| h.order);
        let steps = self.steps.into_iter().map(|s| Step::new(s.content)).collect();
        let hints = self.hints.into_iter().map(|h| Hint::new(h.content)).collect();

        Problem::new(
            id,
            self.title,
            self.subject,
            difficulty,
            self.description,
            self.solution,
            steps,
            hints,
        )
        .map_err(|err: ProblemError| ApiError::Decode(err.to_string()))
    }
}

impl ProgressDto {
    pub(crate) fn into_domain(self) -> Result<ProgressRecord, ApiError> {
        Ok(ProgressRecord {
            problem_id: ProblemId::new(id_from_wire(self.problem_id, "problem id")?),
            current_step: count_from_wire(self.current_step, "current_step")?,
            hints_used: count_from_wire(self.hints_used, "hints_used")?,
            completed: self.completed,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
