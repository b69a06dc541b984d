mod ids;
mod question;

pub use ids::QuestionId;
pub use question::{Question, QuestionDraft, QuestionValidationError};
