#![forbid(unsafe_code)]

pub mod model;
pub mod session;

pub use model::{Question, QuestionDraft, QuestionId, QuestionValidationError};
pub use session::{
    Applied, IndexPicker, Intent, Progress, StudyMode, StudySessionState, SyncRequest,
};
