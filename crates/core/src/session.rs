use std::collections::HashSet;

use crate::model::{Question, QuestionId};

//
// ─── MODE ──────────────────────────────────────────────────────────────────────
//

/// Which surface the session is currently presenting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StudyMode {
    /// Reviewing, selecting, and managing the full question set.
    #[default]
    Browsing,
    /// Presenting one selected question at a time in random order.
    Quizzing,
}

//
// ─── INTENTS ───────────────────────────────────────────────────────────────────
//

/// A state-changing request dispatched by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Add the id to the selection if absent, remove it otherwise.
    ToggleSelection(QuestionId),
    /// Replace the selection with the ids of every not-yet-known question.
    SelectAllUnknown,
    /// Enter quiz mode on the current selection, or on everything when the
    /// selection is empty.
    StartQuiz,
    /// Leave quiz mode; selection and mastery flags are preserved.
    ReturnToBrowsing,
    /// Flag a question as mastered. A miss on the id is a no-op.
    MarkKnown(QuestionId),
    /// Clear a question's mastery flag. A miss on the id is a no-op.
    MarkUnknown(QuestionId),
    /// Draw the next quiz question from the selection, with replacement.
    Advance,
    /// Clear every question's mastery flag.
    ResetProgress,
    /// Seed the question list after the initial fetch completes.
    LoadQuestions(Vec<Question>),
}

/// Store write that must be mirrored after a transition.
///
/// Emitted once the in-memory change has already been applied (optimistic
/// update); the caller runs the write and keeps the local state on failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncRequest {
    SetKnown { id: QuestionId, known: bool },
    ResetAll,
}

/// Outcome of applying a single intent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Applied {
    /// Store write the caller should mirror, if any.
    pub sync: Option<SyncRequest>,
    /// True when `StartQuiz` found an empty selection and fell back to
    /// selecting every question. Callers surface this as a notice.
    pub selected_all_fallback: bool,
}

//
// ─── RANDOM INDEX PROVIDER ─────────────────────────────────────────────────────
//

/// Supplies the random index drawn by [`Intent::Advance`].
///
/// Injected so tests can script draws; the production implementation lives in
/// the services crate.
pub trait IndexPicker {
    /// Returns an index in `[0, len)`. Only called with `len >= 1`.
    fn pick(&mut self, len: usize) -> usize;
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Derived mastery numbers, computed on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub known: usize,
    pub total: usize,
    /// `round(100 * known / total)`, or 0 for an empty question list.
    pub percentage: u8,
}

//
// ─── SESSION STATE ─────────────────────────────────────────────────────────────
//

/// In-memory study session: the loaded question list, the user's selection,
/// and the browsing/quizzing mode machine.
///
/// All mutation flows through [`StudySessionState::apply`]; reads go through
/// the derived queries. The quiz list is recomputed from live state on every
/// read rather than snapshotted at `StartQuiz`, so edits made mid-quiz can
/// shift which question the active index resolves to. That matches the
/// source behavior and is intentional.
#[derive(Debug, Clone, Default)]
pub struct StudySessionState {
    questions: Vec<Question>,
    selected_ids: HashSet<QuestionId>,
    mode: StudyMode,
    active_index: Option<usize>,
}

impl StudySessionState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Questions in load order.
    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn selected_ids(&self) -> &HashSet<QuestionId> {
        &self.selected_ids
    }

    #[must_use]
    pub fn is_selected(&self, id: &QuestionId) -> bool {
        self.selected_ids.contains(id)
    }

    #[must_use]
    pub fn mode(&self) -> StudyMode {
        self.mode
    }

    /// Index into the filtered (selected) list; `Some` only while quizzing.
    #[must_use]
    pub fn active_index(&self) -> Option<usize> {
        self.active_index
    }

    /// Apply one intent and return what the outside world must mirror.
    ///
    /// Transitions are synchronous and atomic per intent; `picker` is only
    /// consulted for [`Intent::Advance`].
    pub fn apply(&mut self, intent: Intent, picker: &mut dyn IndexPicker) -> Applied {
        match intent {
            Intent::ToggleSelection(id) => {
                if !self.selected_ids.remove(&id) {
                    self.selected_ids.insert(id);
                }
                Applied::default()
            }

            Intent::SelectAllUnknown => {
                self.selected_ids = self
                    .questions
                    .iter()
                    .filter(|q| !q.known())
                    .map(|q| q.id().clone())
                    .collect();
                Applied::default()
            }

            Intent::StartQuiz => {
                let selected_all_fallback = self.selected_ids.is_empty();
                if selected_all_fallback {
                    self.selected_ids = self.questions.iter().map(|q| q.id().clone()).collect();
                }
                self.mode = StudyMode::Quizzing;
                self.active_index = Some(0);
                Applied {
                    sync: None,
                    selected_all_fallback,
                }
            }

            Intent::ReturnToBrowsing => {
                self.mode = StudyMode::Browsing;
                self.active_index = None;
                Applied::default()
            }

            Intent::MarkKnown(id) => self.set_known_flag(&id, true),
            Intent::MarkUnknown(id) => self.set_known_flag(&id, false),

            Intent::Advance => {
                if self.mode != StudyMode::Quizzing {
                    return Applied::default();
                }
                let len = self.selected_questions().count();
                if len == 0 {
                    self.mode = StudyMode::Browsing;
                    self.active_index = None;
                } else {
                    self.active_index = Some(picker.pick(len));
                }
                Applied::default()
            }

            Intent::ResetProgress => {
                for question in &mut self.questions {
                    question.set_known(false);
                }
                Applied {
                    sync: Some(SyncRequest::ResetAll),
                    selected_all_fallback: false,
                }
            }

            Intent::LoadQuestions(list) => {
                self.questions = list;
                Applied::default()
            }
        }
    }

    fn set_known_flag(&mut self, id: &QuestionId, known: bool) -> Applied {
        // Stale ids are tolerated: a miss is a no-op, and no sync is emitted
        // because nothing changed locally.
        let Some(question) = self.questions.iter_mut().find(|q| q.id() == id) else {
            return Applied::default();
        };

        question.set_known(known);
        Applied {
            sync: Some(SyncRequest::SetKnown {
                id: id.clone(),
                known,
            }),
            selected_all_fallback: false,
        }
    }

    fn selected_questions(&self) -> impl Iterator<Item = &Question> {
        self.questions
            .iter()
            .filter(|q| self.selected_ids.contains(q.id()))
    }

    /// The question the quiz is currently presenting.
    ///
    /// Recomputes the filtered list fresh and indexes into it with the active
    /// index. Returns `None` outside quiz mode, when the filtered list is
    /// empty, or when the index falls out of bounds.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.mode != StudyMode::Quizzing {
            return None;
        }
        let index = self.active_index?;
        self.selected_questions().nth(index)
    }

    /// Mastery progress over the full question list.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn progress(&self) -> Progress {
        let total = self.questions.len();
        let known = self.questions.iter().filter(|q| q.known()).count();
        let percentage = if total == 0 {
            0
        } else {
            (known as f64 / total as f64 * 100.0).round() as u8
        };
        Progress {
            known,
            total,
            percentage,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
