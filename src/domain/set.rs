// src/domain/set.rs
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A set as seen by clients. Derived from flashcards on every read; the `id` is
/// a sequence number and is not stable between reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    pub id: usize,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub card_count: usize,
}
