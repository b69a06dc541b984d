use std::sync::Arc;

use flashcards_core::model::Question;
use flashcards_core::session::{
    Applied, IndexPicker, Intent, Progress, StudySessionState, SyncRequest,
};
use storage::repository::QuestionRepository;

use crate::error::LoadError;

//
// ─── LOAD PHASE ────────────────────────────────────────────────────────────────
//

/// Lifecycle of the one-shot initial load, tracked apart from the session
/// state itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    /// Human-readable message for the error-display state.
    Failed(String),
}

//
// ─── SYNC TRACKING ─────────────────────────────────────────────────────────────
//

/// A store write that was attempted and rejected.
///
/// The optimistic local change is kept (no rollback); the message becomes a
/// transient notice. Local and remote state may diverge until the next
/// successful write for the same target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncFailure {
    pub request: SyncRequest,
    pub message: String,
}

//
// ─── STUDY SERVICE ─────────────────────────────────────────────────────────────
//

/// Orchestrates a study session against the persistence collaborator.
///
/// Intents apply synchronously through the state machine; the store writes
/// they require are queued on an observable pending list and pushed by
/// [`StudyService::flush_syncs`]. That keeps the optimistic-update flow
/// testable instead of detaching unawaited calls.
pub struct StudyService {
    state: StudySessionState,
    questions: Arc<dyn QuestionRepository>,
    picker: Box<dyn IndexPicker + Send>,
    load_phase: LoadPhase,
    pending: Vec<SyncRequest>,
    failures: Vec<SyncFailure>,
}

impl StudyService {
    #[must_use]
    pub fn new(questions: Arc<dyn QuestionRepository>, picker: Box<dyn IndexPicker + Send>) -> Self {
        Self {
            state: StudySessionState::new(),
            questions,
            picker,
            load_phase: LoadPhase::Idle,
            pending: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Fetch every question from the store and seed the session.
    ///
    /// One-shot on the happy path; calling it again is the full-restart
    /// retry after a failure. Returns the number of questions loaded.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` and enters `LoadPhase::Failed` when the fetch or
    /// record validation fails; no questions are available in that state.
    pub async fn load(&mut self) -> Result<usize, LoadError> {
        self.load_phase = LoadPhase::Loading;

        let records = match self.questions.fetch_all().await {
            Ok(records) => records,
            Err(err) => {
                self.load_phase = LoadPhase::Failed(err.to_string());
                return Err(err.into());
            }
        };

        let mut loaded = Vec::with_capacity(records.len());
        for record in records {
            match record.into_question() {
                Ok(question) => loaded.push(question),
                Err(err) => {
                    self.load_phase = LoadPhase::Failed(err.to_string());
                    return Err(err.into());
                }
            }
        }

        let count = loaded.len();
        self.state
            .apply(Intent::LoadQuestions(loaded), self.picker.as_mut());
        self.load_phase = LoadPhase::Ready;
        Ok(count)
    }

    /// Apply one intent to the session.
    ///
    /// Any store write the transition requires is queued; call
    /// [`StudyService::flush_syncs`] to push it.
    pub fn dispatch(&mut self, intent: Intent) -> Applied {
        let applied = self.state.apply(intent, self.picker.as_mut());
        if let Some(sync) = applied.sync.clone() {
            self.pending.push(sync);
        }
        applied
    }

    /// Drain the pending writes and run each against the store.
    ///
    /// Failures are swallowed into [`SyncFailure`] records — no retry, no
    /// rollback of the local state. Returns how many writes failed.
    pub async fn flush_syncs(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        let mut failed = 0;
        for request in pending {
            let result = match &request {
                SyncRequest::SetKnown { id, known } => self.questions.set_known(id, *known).await,
                SyncRequest::ResetAll => self.questions.reset_all().await,
            };
            if let Err(err) = result {
                failed += 1;
                self.failures.push(SyncFailure {
                    request,
                    message: err.to_string(),
                });
            }
        }
        failed
    }

    #[must_use]
    pub fn state(&self) -> &StudySessionState {
        &self.state
    }

    #[must_use]
    pub fn load_phase(&self) -> &LoadPhase {
        &self.load_phase
    }

    /// Store writes queued but not yet flushed.
    #[must_use]
    pub fn pending_syncs(&self) -> &[SyncRequest] {
        &self.pending
    }

    /// Every sync failure recorded so far.
    #[must_use]
    pub fn failures(&self) -> &[SyncFailure] {
        &self.failures
    }

    /// Drain the recorded failures, e.g. after showing them as notices.
    pub fn take_failures(&mut self) -> Vec<SyncFailure> {
        std::mem::take(&mut self.failures)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question()
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.state.progress()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use flashcards_core::model::QuestionId;
    use flashcards_core::session::StudyMode;
    use storage::repository::{InMemoryRepository, QuestionRecord, StorageError};

    /// Picker for flows that never reach a quiz draw.
    struct NoPicker;

    impl IndexPicker for NoPicker {
        fn pick(&mut self, _len: usize) -> usize {
            panic!("no draw expected in this test");
        }
    }

    /// Repository whose writes always fail, for exercising the optimistic
    /// no-rollback path.
    struct WriteFailingRepository {
        inner: InMemoryRepository,
    }

    #[async_trait]
    impl QuestionRepository for WriteFailingRepository {
        async fn fetch_all(&self) -> Result<Vec<QuestionRecord>, StorageError> {
            self.inner.fetch_all().await
        }

        async fn set_known(&self, _id: &QuestionId, _known: bool) -> Result<(), StorageError> {
            Err(StorageError::Connection("store offline".into()))
        }

        async fn reset_all(&self) -> Result<(), StorageError> {
            Err(StorageError::Connection("store offline".into()))
        }
    }

    /// Repository whose reads always fail, for exercising the load error
    /// state.
    struct FetchFailingRepository;

    #[async_trait]
    impl QuestionRepository for FetchFailingRepository {
        async fn fetch_all(&self) -> Result<Vec<QuestionRecord>, StorageError> {
            Err(StorageError::Connection("store offline".into()))
        }

        async fn set_known(&self, _id: &QuestionId, _known: bool) -> Result<(), StorageError> {
            Ok(())
        }

        async fn reset_all(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn record(id: &str) -> QuestionRecord {
        QuestionRecord {
            id: id.to_owned(),
            question: format!("Q {id}"),
            answer: format!("A {id}"),
            known: false,
        }
    }

    fn seeded_repo(ids: &[&str]) -> InMemoryRepository {
        InMemoryRepository::with_records(ids.iter().map(|id| record(id)).collect())
    }

    #[tokio::test]
    async fn load_seeds_state_and_reaches_ready() {
        let repo = seeded_repo(&["a", "b", "c"]);
        let mut service = StudyService::new(Arc::new(repo), Box::new(NoPicker));
        assert_eq!(service.load_phase(), &LoadPhase::Idle);

        let count = service.load().await.unwrap();

        assert_eq!(count, 3);
        assert_eq!(service.load_phase(), &LoadPhase::Ready);
        assert_eq!(service.state().questions().len(), 3);
    }

    #[tokio::test]
    async fn failed_load_records_message_and_blocks_session() {
        let mut service = StudyService::new(Arc::new(FetchFailingRepository), Box::new(NoPicker));

        let err = service.load().await.unwrap_err();

        assert!(matches!(err, LoadError::Storage(_)));
        assert!(matches!(service.load_phase(), LoadPhase::Failed(_)));
        assert!(service.state().questions().is_empty());
    }

    #[tokio::test]
    async fn reload_after_failure_recovers() {
        let mut service = StudyService::new(Arc::new(FetchFailingRepository), Box::new(NoPicker));
        let _ = service.load().await;

        // Full restart against a healthy store.
        let repo = seeded_repo(&["a"]);
        let mut service = StudyService::new(Arc::new(repo), Box::new(NoPicker));
        service.load().await.unwrap();
        assert_eq!(service.load_phase(), &LoadPhase::Ready);
    }

    #[tokio::test]
    async fn mark_known_queues_then_flushes_to_store() {
        let repo = seeded_repo(&["a", "b"]);
        let mut service = StudyService::new(Arc::new(repo.clone()), Box::new(NoPicker));
        service.load().await.unwrap();

        service.dispatch(Intent::MarkKnown(QuestionId::new("b")));
        assert_eq!(service.pending_syncs().len(), 1);

        let failed = service.flush_syncs().await;
        assert_eq!(failed, 0);
        assert!(service.pending_syncs().is_empty());

        let records = repo.fetch_all().await.unwrap();
        assert!(!records[0].known);
        assert!(records[1].known);
    }

    #[tokio::test]
    async fn failed_sync_keeps_local_state_and_records_failure() {
        let repo = WriteFailingRepository {
            inner: seeded_repo(&["a"]),
        };
        let mut service = StudyService::new(Arc::new(repo), Box::new(NoPicker));
        service.load().await.unwrap();

        service.dispatch(Intent::MarkKnown(QuestionId::new("a")));
        let failed = service.flush_syncs().await;

        assert_eq!(failed, 1);
        // Optimistic update survives the failed write.
        assert!(service.state().questions()[0].known());
        let failures = service.take_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(
            failures[0].request,
            SyncRequest::SetKnown {
                id: QuestionId::new("a"),
                known: true,
            }
        );
        assert!(service.failures().is_empty());
    }

    #[tokio::test]
    async fn reset_progress_flushes_a_bulk_write() {
        let repo = seeded_repo(&["a", "b"]);
        repo.upsert(QuestionRecord {
            known: true,
            ..record("a")
        })
        .unwrap();
        let mut service = StudyService::new(Arc::new(repo.clone()), Box::new(NoPicker));
        service.load().await.unwrap();

        service.dispatch(Intent::ResetProgress);
        assert_eq!(service.pending_syncs(), &[SyncRequest::ResetAll]);
        service.flush_syncs().await;

        let records = repo.fetch_all().await.unwrap();
        assert!(records.iter().all(|r| !r.known));
    }

    #[tokio::test]
    async fn lookup_miss_queues_nothing() {
        let repo = seeded_repo(&["a"]);
        let mut service = StudyService::new(Arc::new(repo), Box::new(NoPicker));
        service.load().await.unwrap();

        let applied = service.dispatch(Intent::MarkKnown(QuestionId::new("ghost")));

        assert_eq!(applied.sync, None);
        assert!(service.pending_syncs().is_empty());
    }

    #[tokio::test]
    async fn start_quiz_fallback_is_visible_to_the_caller() {
        let repo = seeded_repo(&["a", "b"]);
        let mut service = StudyService::new(Arc::new(repo), Box::new(NoPicker));
        service.load().await.unwrap();

        let applied = service.dispatch(Intent::StartQuiz);

        assert!(applied.selected_all_fallback);
        assert_eq!(service.state().mode(), StudyMode::Quizzing);
        assert!(service.current_question().is_some());
    }
}
