use thiserror::Error;

use crate::backend::BackendError;
use crate::session::SessionError;

pub type TrainerResult<T> = Result<T, TrainerError>;

#[derive(Error, Debug)]
pub enum TrainerError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Nothing to train in repertoire {0}")]
    NothingToTrain(String),
}
