// src/domain/mod.rs
pub mod counters;
pub mod error;
pub mod flashcard;
pub mod set;

pub use counters::{Counters, EntityKind};
pub use error::DomainError;
pub use flashcard::{Flashcard, FlashcardPatch, NewFlashcard};
pub use set::FlashcardSet;
