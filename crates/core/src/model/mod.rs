mod ids;
mod problem;
mod progress;
mod user;

pub use ids::{ParseIdError, ProblemId, UserId};
pub use problem::{Hint, Problem, ProblemError, Step};
pub use progress::{ProgressError, ProgressRecord};
pub use user::{AuthToken, TokenError, User};
