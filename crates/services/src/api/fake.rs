//! In-memory `PlatformApi` reproducing the backend's observable semantics:
//! token issuance and expiry, duplicate-registration rejection, and
//! create-on-first-write progress upsert.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use reqwest::StatusCode;

use guided_core::model::{AuthToken, Problem, ProblemId, ProgressRecord, User, UserId};

use crate::error::ApiError;

use super::{NewUser, PlatformApi, ProblemPage, ProgressUpdate};

struct Account {
    user: User,
    password: String,
}

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    tokens: HashMap<String, UserId>,
    problems: HashMap<ProblemId, Problem>,
    progress: HashMap<(UserId, ProblemId), ProgressRecord>,
    next_user_id: u64,
    next_token: u64,
    fail_updates: bool,
}

/// Simple in-memory backend for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryApi {
    inner: Arc<Mutex<Inner>>,
}

impl InMemoryApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, ApiError> {
        self.inner
            .lock()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Seed a problem into the catalog.
    ///
    /// # Panics
    ///
    /// Panics if the backing lock is poisoned.
    pub fn add_problem(&self, problem: Problem) {
        let mut inner = self.inner.lock().expect("fake api lock");
        inner.problems.insert(problem.id(), problem);
    }

    /// Invalidate an issued token, simulating server-side expiry.
    ///
    /// # Panics
    ///
    /// Panics if the backing lock is poisoned.
    pub fn expire_token(&self, token: &AuthToken) {
        let mut inner = self.inner.lock().expect("fake api lock");
        inner.tokens.remove(token.as_str());
    }

    /// Make every subsequent progress update fail with a 500, for
    /// rollback-path tests.
    ///
    /// # Panics
    ///
    /// Panics if the backing lock is poisoned.
    pub fn set_fail_updates(&self, fail: bool) {
        let mut inner = self.inner.lock().expect("fake api lock");
        inner.fail_updates = fail;
    }

    fn authorize(inner: &Inner, token: &AuthToken) -> Result<UserId, ApiError> {
        inner
            .tokens
            .get(token.as_str())
            .copied()
            .ok_or_else(|| ApiError::Authentication("Could not validate credentials".into()))
    }
}

#[async_trait]
impl PlatformApi for InMemoryApi {
    async fn login(&self, username: &str, password: &str) -> Result<AuthToken, ApiError> {
        let mut inner = self.lock()?;
        let user_id = inner
            .accounts
            .iter()
            .find(|acc| acc.user.username == username && acc.password == password)
            .map(|acc| acc.user.id)
            .ok_or_else(|| ApiError::Authentication("Incorrect username or password".into()))?;

        inner.next_token += 1;
        let raw = format!("token-{}", inner.next_token);
        inner.tokens.insert(raw.clone(), user_id);
        AuthToken::new(raw).map_err(|err| ApiError::Decode(err.to_string()))
    }

    async fn register(&self, new_user: &NewUser) -> Result<User, ApiError> {
        let mut inner = self.lock()?;
        if inner
            .accounts
            .iter()
            .any(|acc| acc.user.username == new_user.username)
        {
            return Err(ApiError::Validation("Username already taken".into()));
        }
        if inner
            .accounts
            .iter()
            .any(|acc| acc.user.email == new_user.email)
        {
            return Err(ApiError::Validation("Email already registered".into()));
        }

        inner.next_user_id += 1;
        let user = User {
            id: UserId::new(inner.next_user_id),
            username: new_user.username.clone(),
            email: new_user.email.clone(),
            is_active: true,
        };
        inner.accounts.push(Account {
            user: user.clone(),
            password: new_user.password.clone(),
        });
        Ok(user)
    }

    async fn current_user(&self, token: &AuthToken) -> Result<User, ApiError> {
        let inner = self.lock()?;
        let user_id = Self::authorize(&inner, token)?;
        inner
            .accounts
            .iter()
            .find(|acc| acc.user.id == user_id)
            .map(|acc| acc.user.clone())
            .ok_or_else(|| ApiError::Authentication("Could not validate credentials".into()))
    }

    async fn list_problems(&self, page: ProblemPage) -> Result<Vec<Problem>, ApiError> {
        let inner = self.lock()?;
        let mut problems: Vec<Problem> = inner.problems.values().cloned().collect();
        problems.sort_by_key(Problem::id);
        Ok(problems
            .into_iter()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .collect())
    }

    async fn get_problem(&self, id: ProblemId) -> Result<Problem, ApiError> {
        let inner = self.lock()?;
        inner
            .problems
            .get(&id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Problem not found".into()))
    }

    async fn list_progress(&self, token: &AuthToken) -> Result<Vec<ProgressRecord>, ApiError> {
        let inner = self.lock()?;
        let user_id = Self::authorize(&inner, token)?;
        let mut records: Vec<ProgressRecord> = inner
            .progress
            .iter()
            .filter(|((uid, _), _)| *uid == user_id)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by_key(|record| record.problem_id);
        Ok(records)
    }

    async fn get_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
    ) -> Result<ProgressRecord, ApiError> {
        let inner = self.lock()?;
        let user_id = Self::authorize(&inner, token)?;
        inner
            .progress
            .get(&(user_id, problem_id))
            .cloned()
            .ok_or_else(|| ApiError::NotFound("Progress not found".into()))
    }

    async fn update_progress(
        &self,
        token: &AuthToken,
        problem_id: ProblemId,
        update: &ProgressUpdate,
    ) -> Result<ProgressRecord, ApiError> {
        let mut inner = self.lock()?;
        let user_id = Self::authorize(&inner, token)?;
        if inner.fail_updates {
            return Err(ApiError::HttpStatus(StatusCode::INTERNAL_SERVER_ERROR));
        }

        // Upsert: first write creates the record, matching the backend.
        let record = inner
            .progress
            .entry((user_id, problem_id))
            .or_insert_with(|| ProgressRecord::fresh(problem_id));
        if let Some(current_step) = update.current_step {
            record.current_step = current_step;
        }
        if let Some(completed) = update.completed {
            record.completed = completed;
        }
        if let Some(hints_used) = update.hints_used {
            record.hints_used = hints_used;
        }
        Ok(record.clone())
    }
}
