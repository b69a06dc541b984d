#![forbid(unsafe_code)]

pub mod fixture;
pub mod repository;
pub mod rest;

pub use repository::{
    InMemoryRepository, QuestionRecord, QuestionRepository, Storage, StorageError,
};
pub use rest::{RestQuestionRepository, StoreConfig};
