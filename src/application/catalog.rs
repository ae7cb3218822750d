// src/application/catalog.rs
use std::sync::Arc;

use tracing::{error, info};

use crate::application::{
    Bootstrapper, FlashcardRepository, IdGenerator, KeyValueStore, SetCatalog, StorageTier,
};
use crate::domain::DomainError;

/// Entry point to the data layer: flashcards, sets and seeding over one
/// injected store handle.
#[derive(Clone)]
pub struct Catalog {
    store: Arc<dyn KeyValueStore>,
    flashcards: FlashcardRepository,
    sets: SetCatalog,
    bootstrap: Bootstrapper,
}

impl Catalog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let ids = IdGenerator::new(store.clone());
        let flashcards = FlashcardRepository::new(store.clone(), ids);
        Self {
            store,
            sets: SetCatalog::new(flashcards.clone()),
            bootstrap: Bootstrapper::new(flashcards.clone()),
            flashcards,
        }
    }

    pub fn flashcards(&self) -> &FlashcardRepository {
        &self.flashcards
    }

    pub fn sets(&self) -> &SetCatalog {
        &self.sets
    }

    /// Seed sample data into an empty collection. Failures are logged only.
    pub async fn ensure_seeded(&self) {
        match self.bootstrap.seed_if_empty().await {
            Ok(true) => info!("Initialized store with sample data"),
            Ok(false) => {}
            Err(e) => error!(error = %e, "Failed to initialize sample data"),
        }
    }

    pub fn storage_tier(&self) -> StorageTier {
        self.store.active_tier()
    }

    pub async fn close(&self) -> Result<(), DomainError> {
        self.store.close().await
    }
}
