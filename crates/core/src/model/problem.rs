use thiserror::Error;

use crate::model::ids::ProblemId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProblemError {
    #[error("problem title cannot be empty")]
    EmptyTitle,

    #[error("problem subject cannot be empty")]
    EmptySubject,

    #[error("difficulty must be between 1 and 10, got {0}")]
    InvalidDifficulty(u8),
}

//
// ─── STEP & HINT ───────────────────────────────────────────────────────────────
//

/// One unit of guided-solution content. Position is implicit via the
/// problem's step sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    content: String,
}

impl Step {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Supplementary content revealed on demand. Only usage is counted; the
/// content itself carries no state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hint {
    content: String,
}

impl Hint {
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

//
// ─── PROBLEM ───────────────────────────────────────────────────────────────────
//

/// A learning exercise with ordered steps, hints, and a solution.
///
/// Immutable once fetched for the session; all progress state lives in
/// `ProgressRecord`, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    id: ProblemId,
    title: String,
    subject: String,
    difficulty: u8,
    description: String,
    solution: String,
    steps: Vec<Step>,
    hints: Vec<Hint>,
}

impl Problem {
    /// Creates a new Problem.
    ///
    /// # Errors
    ///
    /// Returns `ProblemError::EmptyTitle` or `ProblemError::EmptySubject` if
    /// either is empty or whitespace-only, and
    /// `ProblemError::InvalidDifficulty` if difficulty is outside 1..=10.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProblemId,
        title: impl Into<String>,
        subject: impl Into<String>,
        difficulty: u8,
        description: impl Into<String>,
        solution: impl Into<String>,
        steps: Vec<Step>,
        hints: Vec<Hint>,
    ) -> Result<Self, ProblemError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ProblemError::EmptyTitle);
        }
        let subject = subject.into();
        if subject.trim().is_empty() {
            return Err(ProblemError::EmptySubject);
        }
        if !(1..=10).contains(&difficulty) {
            return Err(ProblemError::InvalidDifficulty(difficulty));
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            subject: subject.trim().to_owned(),
            difficulty,
            description: description.into(),
            solution: solution.into(),
            steps,
            hints,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> ProblemId {
        self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    #[must_use]
    pub fn difficulty(&self) -> u8 {
        self.difficulty
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn solution(&self) -> &str {
        &self.solution
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    #[must_use]
    pub fn hints(&self) -> &[Hint] {
        &self.hints
    }

    /// Number of steps in the guided solution.
    #[must_use]
    pub fn step_count(&self) -> u32 {
        u32::try_from(self.steps.len()).unwrap_or(u32::MAX)
    }

    /// The first hint in sequence, the only one the current design surfaces.
    #[must_use]
    pub fn first_hint(&self) -> Option<&Hint> {
        self.hints.first()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn steps(n: usize) -> Vec<Step> {
        (1..=n).map(|i| Step::new(format!("step {i}"))).collect()
    }

    #[test]
    fn problem_new_rejects_empty_title() {
        let err = Problem::new(
            ProblemId::new(1),
            "   ",
            "algebra",
            3,
            "desc",
            "solution",
            steps(2),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ProblemError::EmptyTitle);
    }

    #[test]
    fn problem_new_rejects_empty_subject() {
        let err = Problem::new(
            ProblemId::new(1),
            "Quadratics",
            "",
            3,
            "desc",
            "solution",
            steps(2),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ProblemError::EmptySubject);
    }

    #[test]
    fn problem_new_rejects_out_of_range_difficulty() {
        let err = Problem::new(
            ProblemId::new(1),
            "Quadratics",
            "algebra",
            0,
            "desc",
            "solution",
            steps(2),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ProblemError::InvalidDifficulty(0));

        let err = Problem::new(
            ProblemId::new(1),
            "Quadratics",
            "algebra",
            11,
            "desc",
            "solution",
            steps(2),
            vec![],
        )
        .unwrap_err();
        assert_eq!(err, ProblemError::InvalidDifficulty(11));
    }

    #[test]
    fn problem_new_happy_path_trims_title() {
        let problem = Problem::new(
            ProblemId::new(7),
            "  Quadratics  ",
            " algebra ",
            5,
            "Solve x^2 = 4",
            "x = ±2",
            steps(3),
            vec![Hint::new("try factoring")],
        )
        .unwrap();

        assert_eq!(problem.id(), ProblemId::new(7));
        assert_eq!(problem.title(), "Quadratics");
        assert_eq!(problem.subject(), "algebra");
        assert_eq!(problem.difficulty(), 5);
        assert_eq!(problem.step_count(), 3);
        assert_eq!(problem.first_hint().unwrap().content(), "try factoring");
    }

    #[test]
    fn problem_allows_zero_steps() {
        // The backend can serve a problem with no authored steps yet; the
        // walker treats it as immediately complete.
        let problem = Problem::new(
            ProblemId::new(1),
            "Empty",
            "misc",
            1,
            "desc",
            "solution",
            vec![],
            vec![],
        )
        .unwrap();
        assert_eq!(problem.step_count(), 0);
        assert!(problem.first_hint().is_none());
    }
}
