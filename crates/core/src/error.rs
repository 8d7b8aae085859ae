use thiserror::Error;

use crate::model::ItemError;
use crate::model::ProgressError;
use crate::model::QuestionError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    ItemValidation(#[from] ItemError),
    #[error(transparent)]
    QuestionValidation(#[from] QuestionError),
    #[error(transparent)]
    ProgressValidation(#[from] ProgressError),
}
