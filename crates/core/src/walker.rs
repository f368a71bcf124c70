//! The progress walker: pure transition functions over a `ProgressRecord`.
//!
//! Every user intent on the guided-solution view maps to exactly one
//! transition here. The walker never performs I/O; the caller persists the
//! returned record and reconciles on failure.

use thiserror::Error;

use crate::model::{Problem, ProgressRecord};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum WalkError {
    #[error("problem is already complete")]
    AlreadyComplete,

    #[error("already at the first step")]
    AtStart,
}

//
// ─── INTENTS ───────────────────────────────────────────────────────────────────
//

/// A user intent on the guided-solution view.
///
/// Revealing the *solution* is deliberately absent: it is local visibility
/// state, does not complete the problem, and touches no counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressIntent {
    Advance,
    Retreat,
    Reset,
    RevealHint,
}

//
// ─── TRANSITIONS ───────────────────────────────────────────────────────────────
//

/// Move to the next step, or finish the problem from the last step.
///
/// # Errors
///
/// Returns `WalkError::AlreadyComplete` when `current_step` already equals
/// the step count, including the zero-step case.
pub fn advance(problem: &Problem, record: &ProgressRecord) -> Result<ProgressRecord, WalkError> {
    let step_count = problem.step_count();
    if record.current_step >= step_count {
        return Err(WalkError::AlreadyComplete);
    }

    let current_step = record.current_step + 1;
    Ok(ProgressRecord {
        current_step,
        completed: current_step >= step_count,
        ..record.clone()
    })
}

/// Move back one step. Always clears `completed`.
///
/// # Errors
///
/// Returns `WalkError::AtStart` when `current_step` is 0.
pub fn retreat(problem: &Problem, record: &ProgressRecord) -> Result<ProgressRecord, WalkError> {
    if record.current_step == 0 {
        return Err(WalkError::AtStart);
    }

    let current_step = record.current_step - 1;
    Ok(ProgressRecord {
        current_step,
        completed: current_step >= problem.step_count(),
        ..record.clone()
    })
}

/// Rewind to the first step, keeping the record and its hint counter.
#[must_use]
pub fn reset(record: &ProgressRecord) -> ProgressRecord {
    ProgressRecord {
        current_step: 0,
        completed: false,
        ..record.clone()
    }
}

/// Count one hint reveal. Always legal; the counter is monotonic and has no
/// ceiling even past the number of available hints.
#[must_use]
pub fn reveal_hint(record: &ProgressRecord) -> ProgressRecord {
    ProgressRecord {
        hints_used: record.hints_used.saturating_add(1),
        ..record.clone()
    }
}

/// Apply one intent, producing the record to persist.
///
/// # Errors
///
/// Returns `WalkError` when the intent is illegal in the current position.
pub fn apply(
    problem: &Problem,
    record: &ProgressRecord,
    intent: ProgressIntent,
) -> Result<ProgressRecord, WalkError> {
    match intent {
        ProgressIntent::Advance => advance(problem, record),
        ProgressIntent::Retreat => retreat(problem, record),
        ProgressIntent::Reset => Ok(reset(record)),
        ProgressIntent::RevealHint => Ok(reveal_hint(record)),
    }
}

/// True when the record sits exactly past the last step.
#[must_use]
pub fn is_at_final_step(problem: &Problem, record: &ProgressRecord) -> bool {
    record.current_step == problem.step_count()
}

/// View-level completion check: `current_step >= steps.len()`.
///
/// A zero-step problem counts as immediately complete regardless of the
/// persisted flag.
#[must_use]
pub fn is_complete(problem: &Problem, record: &ProgressRecord) -> bool {
    record.current_step >= problem.step_count()
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
