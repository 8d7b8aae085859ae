//! Shared error types for the services crate.

use thiserror::Error;

use lamed_core::model::{ItemError, ProgressError, QuestionError};
use storage::repository::StorageError;

/// Errors emitted by `QuestionGenerator` and the question sources.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("not enough items to build a question: have {len}, need {needed}")]
    InsufficientPool { len: usize, needed: usize },
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Item(#[from] ItemError),
}

/// Errors emitted by practice sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("session is not active")]
    NotActive,
    #[error(transparent)]
    Generator(#[from] GeneratorError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DashboardService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DashboardError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ApiClient`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    #[error("progress payload rejected: {0}")]
    Rejected(String),
    #[error("request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error("invalid payload in response: {0}")]
    Decode(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}
