//! Catalog store: the problem list and the currently viewed problem.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use guided_core::model::{Problem, ProblemId};

use crate::api::{PlatformApi, ProblemPage};
use crate::error::CatalogError;

/// Snapshot of the catalog slice.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    pub problems: Vec<Problem>,
    pub current_problem: Option<Problem>,
}

/// Fetches and holds the problem catalog. Problems are immutable once
/// fetched for the session.
pub struct CatalogService {
    api: Arc<dyn PlatformApi>,
    state: RwLock<CatalogState>,
}

impl CatalogService {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>) -> Self {
        Self {
            api,
            state: RwLock::new(CatalogState::default()),
        }
    }

    /// Replace the list with a fresh page from the backend. Returns the
    /// number of problems fetched.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` on transport or decode failures.
    pub async fn refresh(&self, page: ProblemPage) -> Result<usize, CatalogError> {
        let problems = self.api.list_problems(page).await?;
        debug!(count = problems.len(), "catalog refreshed");
        let count = problems.len();
        let mut state = self.state.write().await;
        state.problems = problems;
        Ok(count)
    }

    /// Fetch one problem (steps, hints, solution included) and make it the
    /// currently viewed one.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Api` with `NotFound` for an unknown id.
    pub async fn open_problem(&self, id: ProblemId) -> Result<Problem, CatalogError> {
        let problem = self.api.get_problem(id).await?;
        let mut state = self.state.write().await;
        state.current_problem = Some(problem.clone());
        Ok(problem)
    }

    /// Drop the currently viewed problem (leaving the list intact).
    pub async fn clear_current(&self) {
        let mut state = self.state.write().await;
        state.current_problem = None;
    }

    /// Snapshot of the catalog slice.
    pub async fn state(&self) -> CatalogState {
        self.state.read().await.clone()
    }
}
