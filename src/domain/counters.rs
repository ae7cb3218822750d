// src/domain/counters.rs
use serde::{Deserialize, Serialize};

/// Monotonic id counters, persisted as one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub flashcard_id: i64,
    pub set_id: i64,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            flashcard_id: 1,
            set_id: 1,
        }
    }
}

/// Entity types that draw ids from the counters record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Flashcard,
    Set,
}

impl Counters {
    /// Return the current id for `kind` and advance the counter.
    pub fn advance(&mut self, kind: EntityKind) -> i64 {
        let slot = match kind {
            EntityKind::Flashcard => &mut self.flashcard_id,
            EntityKind::Set => &mut self.set_id,
        };
        let id = *slot;
        *slot += 1;
        id
    }
}
