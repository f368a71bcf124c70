use thiserror::Error;

use crate::model::ids::ProblemId;
use crate::model::problem::Problem;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("current step {current_step} is past the end of a {step_count}-step problem")]
    StepOutOfRange { current_step: u32, step_count: u32 },

    #[error("completed flag disagrees with current step {current_step} of {step_count}")]
    InconsistentCompletion { current_step: u32, step_count: u32 },
}

//
// ─── PROGRESS RECORD ───────────────────────────────────────────────────────────
//

/// Per-user, per-problem state machine snapshot.
///
/// The user id is implicit via the authenticated session; the backend keys
/// records by (user, problem). Absence of a record means "not started".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressRecord {
    pub problem_id: ProblemId,
    pub current_step: u32,
    pub hints_used: u32,
    pub completed: bool,
}

impl ProgressRecord {
    /// The record for a problem the user has not touched yet.
    #[must_use]
    pub fn fresh(problem_id: ProblemId) -> Self {
        Self {
            problem_id,
            current_step: 0,
            hints_used: 0,
            completed: false,
        }
    }

    /// Rehydrate a record fetched from the backend, checking it against the
    /// problem it belongs to.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::StepOutOfRange` if the step index exceeds the
    /// problem's step count, or `ProgressError::InconsistentCompletion` if
    /// the record claims completion before the final step. A `false` flag at
    /// the final step is tolerated: the backend defaults `completed` to false
    /// and a hint-only record on a zero-step problem never sets it.
    pub fn from_persisted(
        problem: &Problem,
        current_step: u32,
        hints_used: u32,
        completed: bool,
    ) -> Result<Self, ProgressError> {
        let step_count = problem.step_count();
        if current_step > step_count {
            return Err(ProgressError::StepOutOfRange {
                current_step,
                step_count,
            });
        }
        if completed && current_step < step_count {
            return Err(ProgressError::InconsistentCompletion {
                current_step,
                step_count,
            });
        }

        Ok(Self {
            problem_id: problem.id(),
            current_step,
            hints_used,
            completed,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
