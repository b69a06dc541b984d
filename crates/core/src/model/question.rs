use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── QUESTION TYPES ────────────────────────────────────────────────────────────
//

/// Unvalidated question data as it arrives from the store or a fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    pub id: String,
    pub prompt: String,
    pub answer: String,
    pub known: bool,
}

impl QuestionDraft {
    /// Draft with an unset mastery flag, the default for freshly loaded data.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        prompt: impl Into<String>,
        answer: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            answer: answer.into(),
            known: false,
        }
    }

    /// Validate the draft into a domain `Question`.
    ///
    /// The answer is an opaque renderable payload and may be empty; id and
    /// prompt must not be.
    ///
    /// # Errors
    ///
    /// Returns `QuestionValidationError` when the id or prompt is blank.
    pub fn validate(self) -> Result<Question, QuestionValidationError> {
        if self.id.trim().is_empty() {
            return Err(QuestionValidationError::EmptyId);
        }
        if self.prompt.trim().is_empty() {
            return Err(QuestionValidationError::EmptyPrompt);
        }

        Ok(Question {
            id: QuestionId::new(self.id),
            prompt: self.prompt,
            answer: self.answer,
            known: self.known,
        })
    }
}

/// One flashcard record: prompt, opaque answer payload, and mastery flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    prompt: String,
    answer: String,
    known: bool,
}

impl Question {
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// The answer payload. Plain text or markup; the core never interprets it.
    #[must_use]
    pub fn answer(&self) -> &str {
        &self.answer
    }

    #[must_use]
    pub fn known(&self) -> bool {
        self.known
    }

    pub(crate) fn set_known(&mut self, known: bool) {
        self.known = known;
    }
}

//
// ─── QUESTION VALIDATION ERRORS ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionValidationError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question prompt cannot be empty")]
    EmptyPrompt,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_fails_if_id_blank() {
        let err = QuestionDraft::new("  ", "prompt", "answer")
            .validate()
            .unwrap_err();
        assert_eq!(err, QuestionValidationError::EmptyId);
    }

    #[test]
    fn question_fails_if_prompt_blank() {
        let err = QuestionDraft::new("a", " ", "answer").validate().unwrap_err();
        assert_eq!(err, QuestionValidationError::EmptyPrompt);
    }

    #[test]
    fn question_allows_empty_answer() {
        let question = QuestionDraft::new("a", "prompt", "").validate().unwrap();
        assert_eq!(question.answer(), "");
    }

    #[test]
    fn valid_draft_defaults_to_unknown() {
        let question = QuestionDraft::new("a", "What is ownership?", "<p>...</p>")
            .validate()
            .unwrap();

        assert_eq!(question.id(), &QuestionId::new("a"));
        assert_eq!(question.prompt(), "What is ownership?");
        assert!(!question.known());
    }

    #[test]
    fn draft_preserves_known_flag_from_store() {
        let mut draft = QuestionDraft::new("a", "Q", "A");
        draft.known = true;
        let question = draft.validate().unwrap();
        assert!(question.known());
    }
}
