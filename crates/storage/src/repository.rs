use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};
use thiserror::Error;

use flashcards_core::model::{Question, QuestionDraft, QuestionId, QuestionValidationError};

use crate::fixture;
use crate::rest::{RestQuestionRepository, StoreConfig};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("store request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Persisted shape for a question.
///
/// This mirrors the hosted table row (the prompt travels under the `question`
/// column) so adapters can serialize without leaking wire names into the
/// domain layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub id: String,
    pub question: String,
    pub answer: String,
    pub known: bool,
}

impl QuestionRecord {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            id: question.id().as_str().to_owned(),
            question: question.prompt().to_owned(),
            answer: question.answer().to_owned(),
            known: question.known(),
        }
    }

    /// Convert the record back into a domain `Question`.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` if the id or prompt is blank.
    pub fn into_question(self) -> Result<Question, QuestionValidationError> {
        let mut draft = QuestionDraft::new(self.id, self.question, self.answer);
        draft.known = self.known;
        draft.validate()
    }
}

/// Repository contract for the hosted question store.
///
/// `set_known` and `reset_all` are invoked after the in-memory state has
/// already changed; callers treat failures as notices, not rollbacks.
#[async_trait]
pub trait QuestionRepository: Send + Sync {
    /// Fetch every question with its current mastery flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unreachable or returns bad data.
    async fn fetch_all(&self) -> Result<Vec<QuestionRecord>, StorageError>;

    /// Update exactly one question's mastery flag.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the id is unknown to the store,
    /// or other storage errors.
    async fn set_known(&self, id: &QuestionId, known: bool) -> Result<(), StorageError>;

    /// Set every question's mastery flag to false.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store is unreachable.
    async fn reset_all(&self) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and the offline
/// fallback dataset.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    records: Arc<Mutex<Vec<QuestionRecord>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Repository seeded with the given records, preserving their order.
    #[must_use]
    pub fn with_records(records: Vec<QuestionRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
        }
    }

    /// Insert a record, or replace the one sharing its id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Connection` if the backing lock is poisoned.
    pub fn upsert(&self, record: QuestionRecord) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        match guard.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record,
            None => guard.push(record),
        }
        Ok(())
    }
}

#[async_trait]
impl QuestionRepository for InMemoryRepository {
    async fn fetch_all(&self) -> Result<Vec<QuestionRecord>, StorageError> {
        let guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.clone())
    }

    async fn set_known(&self, id: &QuestionId, known: bool) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let record = guard
            .iter_mut()
            .find(|r| r.id == id.as_str())
            .ok_or(StorageError::NotFound)?;
        record.known = known;
        Ok(())
    }

    async fn reset_all(&self) -> Result<(), StorageError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for record in guard.iter_mut() {
            record.known = false;
        }
        Ok(())
    }
}

/// Aggregates the question repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub questions: Arc<dyn QuestionRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            questions: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Storage preloaded with the bundled sample questions, used when no
    /// hosted store is configured.
    #[must_use]
    pub fn fixture() -> Self {
        Self {
            questions: Arc::new(InMemoryRepository::with_records(fixture::sample_records())),
        }
    }

    /// Storage backed by the hosted REST store.
    #[must_use]
    pub fn rest(config: StoreConfig) -> Self {
        Self {
            questions: Arc::new(RestQuestionRepository::new(config)),
        }
    }

    /// Pick the hosted store when configured, the fixture dataset otherwise.
    #[must_use]
    pub fn from_config(config: Option<StoreConfig>) -> Self {
        match config {
            Some(config) => Self::rest(config),
            None => Self::fixture(),
        }
    }
}
