// src/application/bootstrap.rs
use chrono::{DateTime, Utc};

use crate::application::FlashcardRepository;
use crate::domain::{Counters, DomainError, Flashcard};

/// Counters matching the sample cards (ids 1-3 are taken).
pub const SEEDED_COUNTERS: Counters = Counters {
    flashcard_id: 4,
    set_id: 1,
};

/// The sample cards stored into an empty collection.
pub fn sample_flashcards(now: DateTime<Utc>) -> Vec<Flashcard> {
    [
        ("Hvad er hovedstaden i Danmark?", "København", "Geografi"),
        ("Hvad er 2 + 2?", "4", "Matematik"),
        ("Hvem skrev \"To be or not to be\"?", "William Shakespeare", "Litteratur"),
    ]
    .into_iter()
    .zip(1..)
    .map(|((front, back, set), id)| Flashcard {
        id,
        front: front.to_string(),
        back: back.to_string(),
        set: set.to_string(),
        created_at: now,
        updated_at: None,
        review_count: 0,
    })
    .collect()
}

#[derive(Clone)]
pub struct Bootstrapper {
    repository: FlashcardRepository,
}

impl Bootstrapper {
    pub fn new(repository: FlashcardRepository) -> Self {
        Self { repository }
    }

    /// Store the sample cards if the collection is empty.
    pub async fn seed_if_empty(&self) -> Result<bool, DomainError> {
        self.repository
            .seed(sample_flashcards(Utc::now()), SEEDED_COUNTERS)
            .await
    }
}
