// src/application/set_catalog.rs
use std::collections::HashMap;

use tracing::{info, instrument};

use crate::application::FlashcardRepository;
use crate::constants::{PLACEHOLDER_BACK, PLACEHOLDER_FRONT_PREFIX};
use crate::domain::{DomainError, Flashcard, FlashcardSet, NewFlashcard};
use crate::util::text::{non_blank, same_set, set_key};

/// Group flashcards into sets.
///
/// Groups are keyed by lowercased set name in storage order; a group takes
/// its display name from its first card and its `created_at` from the
/// earliest card. Ids are 1-based group ordinals. The result is sorted by
/// `created_at`, keeping encounter order for ties.
pub fn derive_sets(cards: &[Flashcard]) -> Vec<FlashcardSet> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut sets: Vec<FlashcardSet> = Vec::new();

    for card in cards {
        match index.get(&set_key(&card.set)) {
            Some(&position) => {
                let set = &mut sets[position];
                set.card_count += 1;
                if card.created_at < set.created_at {
                    set.created_at = card.created_at;
                }
            }
            None => {
                index.insert(set_key(&card.set), sets.len());
                sets.push(FlashcardSet {
                    id: sets.len() + 1,
                    name: card.set.clone(),
                    description: String::new(),
                    created_at: card.created_at,
                    card_count: 1,
                });
            }
        }
    }

    sets.sort_by_key(|set| set.created_at);
    sets
}

/// The entry of the placeholder's set within the collection it was written to.
fn created_set(
    cards: &[Flashcard],
    placeholder: &Flashcard,
    description: String,
) -> Result<FlashcardSet, DomainError> {
    let mut set = derive_sets(cards)
        .into_iter()
        .find(|set| same_set(&set.name, &placeholder.set))
        .ok_or_else(|| {
            DomainError::Storage(format!("Set {} missing after insert", placeholder.set))
        })?;
    set.description = description;
    Ok(set)
}

/// The "sets" view over the flashcard collection.
#[derive(Clone)]
pub struct SetCatalog {
    repository: FlashcardRepository,
}

impl SetCatalog {
    pub fn new(repository: FlashcardRepository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> Result<Vec<FlashcardSet>, DomainError> {
        Ok(derive_sets(&self.repository.list().await?))
    }

    /// Make a new set visible by inserting a placeholder card into it.
    #[instrument(level = "debug", skip(self))]
    pub async fn create(
        &self,
        name: &str,
        description: Option<&str>,
    ) -> Result<FlashcardSet, DomainError> {
        let name = non_blank(Some(name))
            .ok_or_else(|| DomainError::Validation("Set name is required".to_string()))?;
        let description = non_blank(description).unwrap_or_default();

        let draft = NewFlashcard::new(format!("{PLACEHOLDER_FRONT_PREFIX}{name}"), PLACEHOLDER_BACK)
            .in_set(name.clone());
        let (placeholder, cards) = self
            .repository
            .create_checked(draft, |cards| {
                if cards.iter().any(|card| same_set(&card.set, &name)) {
                    Err(DomainError::SetAlreadyExists(name.clone()))
                } else {
                    Ok(())
                }
            })
            .await?;

        let set = created_set(&cards, &placeholder, description)?;
        info!(set = %set.name, placeholder_id = placeholder.id, "Created set");
        Ok(set)
    }
}
