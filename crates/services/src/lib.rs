#![forbid(unsafe_code)]

pub mod error;
pub mod picker;
pub mod study_service;

pub use error::LoadError;
pub use picker::RandomPicker;
pub use study_service::{LoadPhase, StudyService, SyncFailure};
