// src/application/id_generator.rs
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::application::store::{load, save, KeyValueStore, StoreKey};
use crate::domain::{Counters, DomainError, EntityKind};

/// Hands out ids from the persisted counters record.
///
/// Callers in one process are serialized; processes sharing an external store
/// can still race, since the store has no compare-and-swap.
#[derive(Clone)]
pub struct IdGenerator {
    store: Arc<dyn KeyValueStore>,
    lock: Arc<Mutex<()>>,
}

impl IdGenerator {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn generate(&self, kind: EntityKind) -> Result<i64, DomainError> {
        let _guard = self.lock.lock().await;
        let mut counters: Counters = load(self.store.as_ref(), StoreKey::Counters).await?;
        let id = counters.advance(kind);
        save(self.store.as_ref(), StoreKey::Counters, &counters).await?;
        debug!(?kind, id, "Generated id");
        Ok(id)
    }

    pub async fn counters(&self) -> Result<Counters, DomainError> {
        let _guard = self.lock.lock().await;
        load(self.store.as_ref(), StoreKey::Counters).await
    }

    /// Raise each counter to at least the given floor; never lowers one.
    pub async fn raise_to(&self, floor: Counters) -> Result<Counters, DomainError> {
        let _guard = self.lock.lock().await;
        let current: Counters = load(self.store.as_ref(), StoreKey::Counters).await?;
        let raised = Counters {
            flashcard_id: current.flashcard_id.max(floor.flashcard_id),
            set_id: current.set_id.max(floor.set_id),
        };
        save(self.store.as_ref(), StoreKey::Counters, &raised).await?;
        Ok(raised)
    }
}
