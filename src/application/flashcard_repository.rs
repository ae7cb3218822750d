// src/application/flashcard_repository.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::application::store::{load, save, KeyValueStore, StoreKey};
use crate::application::IdGenerator;
use crate::domain::{Counters, DomainError, EntityKind, Flashcard, FlashcardPatch, NewFlashcard};
use crate::util::text::same_set;

/// CRUD over the flashcard collection, stored as one list value.
///
/// Every access holds the collection lock, so a mutation's write always
/// follows its own read. Lock order is collection, then counters.
#[derive(Clone)]
pub struct FlashcardRepository {
    store: Arc<dyn KeyValueStore>,
    ids: IdGenerator,
    lock: Arc<Mutex<()>>,
}

impl FlashcardRepository {
    pub fn new(store: Arc<dyn KeyValueStore>, ids: IdGenerator) -> Self {
        Self {
            store,
            ids,
            lock: Arc::new(Mutex::new(())),
        }
    }

    async fn load_all(&self) -> Result<Vec<Flashcard>, DomainError> {
        load(self.store.as_ref(), StoreKey::Flashcards).await
    }

    async fn save_all(&self, cards: &[Flashcard]) -> Result<(), DomainError> {
        save(self.store.as_ref(), StoreKey::Flashcards, cards).await
    }

    /// All flashcards in insertion order.
    pub async fn list(&self) -> Result<Vec<Flashcard>, DomainError> {
        let _guard = self.lock.lock().await;
        self.load_all().await
    }

    pub async fn create(&self, draft: NewFlashcard) -> Result<Flashcard, DomainError> {
        let (card, _) = self.create_checked(draft, |_| Ok(())).await?;
        Ok(card)
    }

    /// Create a flashcard if `check` accepts the current collection.
    ///
    /// The check and the insert run under the same lock. Returns the new card
    /// and the collection as written.
    #[instrument(level = "debug", skip(self, check))]
    pub(crate) async fn create_checked<F>(
        &self,
        draft: NewFlashcard,
        check: F,
    ) -> Result<(Flashcard, Vec<Flashcard>), DomainError>
    where
        F: FnOnce(&[Flashcard]) -> Result<(), DomainError> + Send,
    {
        draft.normalize()?;

        let _guard = self.lock.lock().await;
        let mut cards = self.load_all().await?;
        check(&cards)?;

        let id = self.ids.generate(EntityKind::Flashcard).await?;
        let card = draft.into_flashcard(id, Utc::now())?;
        cards.push(card.clone());
        self.save_all(&cards).await?;

        info!(id, set = %card.set, "Created flashcard");
        Ok((card, cards))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn get_by_id(&self, id: i64) -> Result<Flashcard, DomainError> {
        let _guard = self.lock.lock().await;
        self.load_all()
            .await?
            .into_iter()
            .find(|card| card.id == id)
            .ok_or(DomainError::FlashcardNotFound(id))
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn update(&self, id: i64, patch: FlashcardPatch) -> Result<Flashcard, DomainError> {
        let _guard = self.lock.lock().await;
        let mut cards = self.load_all().await?;
        let card = cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or(DomainError::FlashcardNotFound(id))?;

        patch.apply(card, Utc::now());
        let updated = card.clone();
        self.save_all(&cards).await?;

        info!(id, "Updated flashcard");
        Ok(updated)
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn delete(&self, id: i64) -> Result<Flashcard, DomainError> {
        let _guard = self.lock.lock().await;
        let mut cards = self.load_all().await?;
        let Some(position) = cards.iter().position(|card| card.id == id) else {
            debug!(id, "Flashcard not found for deletion");
            return Err(DomainError::FlashcardNotFound(id));
        };

        let removed = cards.remove(position);
        self.save_all(&cards).await?;

        info!(id, "Deleted flashcard");
        Ok(removed)
    }

    /// Flashcards whose set matches `name` ignoring case, in insertion order.
    pub async fn list_by_set(&self, name: &str) -> Result<Vec<Flashcard>, DomainError> {
        let _guard = self.lock.lock().await;
        Ok(self
            .load_all()
            .await?
            .into_iter()
            .filter(|card| same_set(&card.set, name))
            .collect())
    }

    /// Store `cards` if the collection is empty and raise the counters to at
    /// least `counters`.
    ///
    /// Returns whether anything was written.
    pub(crate) async fn seed(
        &self,
        cards: Vec<Flashcard>,
        counters: Counters,
    ) -> Result<bool, DomainError> {
        let _guard = self.lock.lock().await;
        if !self.load_all().await?.is_empty() {
            return Ok(false);
        }

        self.save_all(&cards).await?;
        self.ids.raise_to(counters).await?;
        info!(count = cards.len(), "Seeded flashcard collection");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryStore;
    use crate::util::testing::MockKeyValueStore;

    fn repository() -> FlashcardRepository {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        FlashcardRepository::new(store.clone(), IdGenerator::new(store))
    }

    #[tokio::test]
    async fn given_valid_draft_when_creating_then_assigns_id_and_defaults() {
        let repo = repository();

        let card = repo.create(NewFlashcard::new(" Q ", " A ")).await.unwrap();

        assert_eq!(card.id, 1);
        assert_eq!(card.front, "Q");
        assert_eq!(card.back, "A");
        assert_eq!(card.set, "General");
        assert_eq!(card.review_count, 0);
        assert!(card.updated_at.is_none());
    }

    #[tokio::test]
    async fn given_blank_back_when_creating_then_never_touches_storage() {
        let mock = Arc::new(MockKeyValueStore::builder().build());
        let store: Arc<dyn KeyValueStore> = mock.clone();
        let repo = FlashcardRepository::new(store.clone(), IdGenerator::new(store));

        let result = repo.create(NewFlashcard::new("Q", "   ")).await;

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(mock.get_calls(), 0);
        assert_eq!(mock.set_calls(), 0);
    }

    #[tokio::test]
    async fn given_cards_when_listing_then_keeps_insertion_order() {
        let repo = repository();
        repo.create(NewFlashcard::new("1", "a")).await.unwrap();
        repo.create(NewFlashcard::new("2", "b")).await.unwrap();
        repo.create(NewFlashcard::new("3", "c")).await.unwrap();

        let fronts: Vec<_> = repo.list().await.unwrap().into_iter().map(|c| c.front).collect();

        assert_eq!(fronts, vec!["1", "2", "3"]);
    }

    #[tokio::test]
    async fn given_unknown_id_when_getting_then_returns_not_found() {
        let repo = repository();

        let result = repo.get_by_id(42).await;

        assert!(matches!(result, Err(DomainError::FlashcardNotFound(42))));
    }

    #[tokio::test]
    async fn given_card_when_updating_with_empty_front_then_only_back_changes() {
        let repo = repository();
        let card = repo.create(NewFlashcard::new("Q", "A")).await.unwrap();

        let updated = repo
            .update(
                card.id,
                FlashcardPatch {
                    front: Some(String::new()),
                    back: Some("X".to_string()),
                    set: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.front, "Q");
        assert_eq!(updated.back, "X");
        assert!(updated.updated_at.is_some());
        assert_eq!(repo.get_by_id(card.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn given_unknown_id_when_updating_then_returns_not_found() {
        let repo = repository();

        let result = repo.update(9, FlashcardPatch::default()).await;

        assert!(matches!(result, Err(DomainError::FlashcardNotFound(9))));
    }

    #[tokio::test]
    async fn given_card_when_deleting_then_returns_removed_card() {
        let repo = repository();
        let card = repo.create(NewFlashcard::new("Q", "A")).await.unwrap();

        let removed = repo.delete(card.id).await.unwrap();

        assert_eq!(removed, card);
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_unknown_id_when_deleting_then_collection_is_unchanged() {
        let repo = repository();
        repo.create(NewFlashcard::new("Q", "A")).await.unwrap();

        let result = repo.delete(99).await;

        assert!(matches!(result, Err(DomainError::FlashcardNotFound(99))));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn given_mixed_case_sets_when_listing_by_set_then_matches_ignoring_case() {
        let repo = repository();
        repo.create(NewFlashcard::new("1", "a").in_set("Geografi")).await.unwrap();
        repo.create(NewFlashcard::new("2", "b").in_set("Matematik")).await.unwrap();
        repo.create(NewFlashcard::new("3", "c").in_set("GEOGRAFI")).await.unwrap();

        let fronts: Vec<_> = repo
            .list_by_set("geografi")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.front)
            .collect();

        assert_eq!(fronts, vec!["1", "3"]);
    }

    #[tokio::test]
    async fn given_rejecting_check_when_creating_checked_then_nothing_is_stored() {
        let repo = repository();

        let result = repo
            .create_checked(NewFlashcard::new("Q", "A"), |_| {
                Err(DomainError::SetAlreadyExists("x".to_string()))
            })
            .await;

        assert!(matches!(result, Err(DomainError::SetAlreadyExists(_))));
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn given_concurrent_creates_when_listing_then_no_update_is_lost() {
        let repo = repository();

        let handles: Vec<_> = (0..10)
            .map(|i| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(NewFlashcard::new(format!("Q{i}"), "A")).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let cards = repo.list().await.unwrap();
        let mut ids: Vec<_> = cards.iter().map(|c| c.id).collect();
        ids.sort_unstable();

        assert_eq!(cards.len(), 10);
        assert_eq!(ids, (1..=10).collect::<Vec<_>>());
    }
}
