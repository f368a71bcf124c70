//! Progress store: per-problem records, driven by the walker and persisted
//! through the upsert endpoint.
//!
//! Updates are optimistic with explicit rollback: the slice reflects the
//! walker's output immediately, one PUT per intent persists it, and a
//! failed PUT restores the last server-confirmed record. Updates for the
//! same problem are serialized so rapid clicks keep last-intent-wins
//! ordering; a stale token additionally tears the session down.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};

use guided_core::model::{Problem, ProblemId, ProgressRecord};
use guided_core::walker::{self, ProgressIntent};

use crate::api::{PlatformApi, ProgressUpdate};
use crate::error::{ApiError, ProgressSyncError};
use crate::session::SessionService;

/// Snapshot of the progress slice.
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    pub records: HashMap<ProblemId, ProgressRecord>,
}

impl ProgressState {
    /// The record for a problem, or the fresh "not started" record.
    #[must_use]
    pub fn record_for(&self, problem_id: ProblemId) -> ProgressRecord {
        self.records
            .get(&problem_id)
            .cloned()
            .unwrap_or_else(|| ProgressRecord::fresh(problem_id))
    }

    /// Number of problems the user has completed.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.records.values().filter(|r| r.completed).count()
    }

    /// Total hints used across all problems.
    #[must_use]
    pub fn total_hints_used(&self) -> u64 {
        self.records
            .values()
            .map(|r| u64::from(r.hints_used))
            .sum()
    }
}

/// Owns the progress slice and orchestrates walker transitions against the
/// backend.
pub struct ProgressService {
    api: Arc<dyn PlatformApi>,
    session: Arc<SessionService>,
    state: RwLock<ProgressState>,
    in_flight: Mutex<HashMap<ProblemId, Arc<Mutex<()>>>>,
}

impl ProgressService {
    #[must_use]
    pub fn new(api: Arc<dyn PlatformApi>, session: Arc<SessionService>) -> Self {
        Self {
            api,
            session,
            state: RwLock::new(ProgressState::default()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the slice with the caller's records from the backend.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSyncError::Session` without a token, or
    /// `ProgressSyncError::Api` on backend rejection (tearing the session
    /// down on 401).
    pub async fn refresh(&self) -> Result<usize, ProgressSyncError> {
        let token = self.session.require_token().await?;
        let records = match self.api.list_progress(&token).await {
            Ok(records) => records,
            Err(err) => {
                self.session.note_api_error(&err).await;
                return Err(err.into());
            }
        };

        debug!(count = records.len(), "progress refreshed");
        let mut state = self.state.write().await;
        state.records = records
            .into_iter()
            .map(|record| (record.problem_id, record))
            .collect();
        Ok(state.records.len())
    }

    /// The stored record for a problem, or the fresh record if the user has
    /// not started it.
    pub async fn record_for(&self, problem_id: ProblemId) -> ProgressRecord {
        self.state.read().await.record_for(problem_id)
    }

    /// Fetch one problem's record from the backend and merge it into the
    /// slice. A missing record means "not started" and yields the fresh
    /// record without an entry in the slice.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSyncError::Session` without a token, or
    /// `ProgressSyncError::Api` on backend rejection (tearing the session
    /// down on 401).
    pub async fn fetch_for(
        &self,
        problem_id: ProblemId,
    ) -> Result<ProgressRecord, ProgressSyncError> {
        let token = self.session.require_token().await?;
        match self.api.get_progress(&token, problem_id).await {
            Ok(record) => {
                let mut state = self.state.write().await;
                state.records.insert(problem_id, record.clone());
                Ok(record)
            }
            Err(ApiError::NotFound(_)) => Ok(ProgressRecord::fresh(problem_id)),
            Err(err) => {
                self.session.note_api_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Apply one user intent to a problem's record and persist the result.
    ///
    /// The slice is updated optimistically before the PUT; on failure it is
    /// rolled back to the prior record and the error surfaced. Calls for the
    /// same problem are serialized; later intents observe the confirmed
    /// outcome of earlier ones.
    ///
    /// # Errors
    ///
    /// Returns `ProgressSyncError::Walk` for an illegal transition,
    /// `ProgressSyncError::Record` if the stored record does not fit the
    /// problem, `ProgressSyncError::Session`/`Api` for auth and transport
    /// failures.
    pub async fn apply(
        &self,
        problem: &Problem,
        intent: ProgressIntent,
    ) -> Result<ProgressRecord, ProgressSyncError> {
        let guard = self.problem_guard(problem.id()).await;
        let _serialized = guard.lock().await;

        let token = self.session.require_token().await?;
        let problem_id = problem.id();

        let prior = {
            let state = self.state.read().await;
            state.records.get(&problem_id).cloned()
        };
        let current = match &prior {
            Some(record) => ProgressRecord::from_persisted(
                problem,
                record.current_step,
                record.hints_used,
                record.completed,
            )?,
            None => ProgressRecord::fresh(problem_id),
        };

        let next = walker::apply(problem, &current, intent)?;

        // Optimistic: show the next step before the write confirms.
        {
            let mut state = self.state.write().await;
            state.records.insert(problem_id, next.clone());
        }

        let update = ProgressUpdate::from_record(&next);
        match self.api.update_progress(&token, problem_id, &update).await {
            Ok(confirmed) => {
                let mut state = self.state.write().await;
                state.records.insert(problem_id, confirmed.clone());
                Ok(confirmed)
            }
            Err(err) => {
                warn!(%problem_id, "progress update failed; rolling back");
                {
                    let mut state = self.state.write().await;
                    match prior {
                        Some(record) => {
                            state.records.insert(problem_id, record);
                        }
                        None => {
                            state.records.remove(&problem_id);
                        }
                    }
                }
                self.session.note_api_error(&err).await;
                Err(err.into())
            }
        }
    }

    /// Snapshot of the progress slice.
    pub async fn state(&self) -> ProgressState {
        self.state.read().await.clone()
    }

    /// One serialization guard per problem; single in-flight update.
    ///
    /// Guards nobody holds (strong count of 1, only the map's reference)
    /// are dropped on the way in, so the map tracks live walks rather than
    /// every problem ever touched.
    async fn problem_guard(&self, problem_id: ProblemId) -> Arc<Mutex<()>> {
        let mut guards = self.in_flight.lock().await;
        guards.retain(|_, guard| Arc::strong_count(guard) > 1);
        Arc::clone(guards.entry(problem_id).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use guided_core::time::fixed_clock;

    fn service() -> ProgressService {
        let api: Arc<dyn PlatformApi> = Arc::new(crate::api::InMemoryApi::new());
        let storage = storage::repository::Storage::in_memory();
        let session = Arc::new(SessionService::new(
            Arc::clone(&api),
            Arc::clone(&storage.sessions),
            fixed_clock(),
        ));
        ProgressService::new(api, session)
    }

    #[tokio::test]
    async fn problem_guard_evicts_idle_entries() {
        let progress = service();
        let one = ProblemId::new(1);
        let two = ProblemId::new(2);

        let held = progress.problem_guard(one).await;
        let _lock = held.lock().await;

        // An unheld guard is dropped the next time the map is consulted; a
        // held one survives.
        drop(progress.problem_guard(two).await);
        let third = progress.problem_guard(ProblemId::new(3)).await;

        let guards = progress.in_flight.lock().await;
        assert!(guards.contains_key(&one));
        assert!(!guards.contains_key(&two));
        assert_eq!(guards.len(), 2);
        drop(guards);
        drop(third);
    }
}
