//! Shared error types for the services crate.

use thiserror::Error;

use flashcards_core::model::QuestionValidationError;
use storage::repository::StorageError;

/// Errors emitted by the one-shot initial load.
///
/// A failed load blocks the session; the recovery path is a full reload, not
/// a partial retry.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("store returned an invalid question: {0}")]
    InvalidQuestion(#[from] QuestionValidationError),
}
