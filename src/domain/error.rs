// src/domain/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Validation(String),
    #[error("Flashcard not found: {0}")]
    FlashcardNotFound(i64),
    #[error("Set already exists: {0}")]
    SetAlreadyExists(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<serde_json::Error> for DomainError {
    fn from(e: serde_json::Error) -> Self {
        DomainError::Storage(format!("Malformed stored value: {}", e))
    }
}
