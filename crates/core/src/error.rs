use thiserror::Error;

use crate::model::{ProblemError, ProgressError, TokenError};
use crate::walker::WalkError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Problem(#[from] ProblemError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Walk(#[from] WalkError),
}
