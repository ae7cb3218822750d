// src/domain/flashcard.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_SET_NAME;
use crate::domain::DomainError;
use crate::util::text::non_blank;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    pub id: i64,
    pub front: String,
    pub back: String,
    pub set: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub review_count: u32,
}

/// Input for creating a flashcard, before validation.
#[derive(Debug, Clone, Default)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
    pub set: Option<String>,
}

impl NewFlashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            set: None,
        }
    }

    pub fn in_set(mut self, set: impl Into<String>) -> Self {
        self.set = Some(set.into());
        self
    }

    /// Trim all fields and reject blank front/back.
    ///
    /// Returns `(front, back, set)` with the set defaulted to "General".
    pub fn normalize(&self) -> Result<(String, String, String), DomainError> {
        let front = non_blank(Some(&self.front));
        let back = non_blank(Some(&self.back));
        let (Some(front), Some(back)) = (front, back) else {
            return Err(DomainError::Validation(
                "Front and back must not be empty".to_string(),
            ));
        };
        let set = non_blank(self.set.as_deref()).unwrap_or_else(|| DEFAULT_SET_NAME.to_string());
        Ok((front, back, set))
    }

    pub fn into_flashcard(self, id: i64, now: DateTime<Utc>) -> Result<Flashcard, DomainError> {
        let (front, back, set) = self.normalize()?;
        Ok(Flashcard {
            id,
            front,
            back,
            set,
            created_at: now,
            updated_at: None,
            review_count: 0,
        })
    }
}

/// Partial update; blank or missing fields keep the stored value.
#[derive(Debug, Clone, Default)]
pub struct FlashcardPatch {
    pub front: Option<String>,
    pub back: Option<String>,
    pub set: Option<String>,
}

impl FlashcardPatch {
    pub fn apply(&self, card: &mut Flashcard, now: DateTime<Utc>) {
        if let Some(front) = non_blank(self.front.as_deref()) {
            card.front = front;
        }
        if let Some(back) = non_blank(self.back.as_deref()) {
            card.back = back;
        }
        if let Some(set) = non_blank(self.set.as_deref()) {
            card.set = set;
        }
        card.updated_at = Some(now);
    }
}
