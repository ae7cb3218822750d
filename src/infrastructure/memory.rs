// src/infrastructure/memory.rs
use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use crate::application::{KeyValueStore, StorageTier, StoreKey};
use crate::domain::DomainError;

/// Process-local store, pre-seeded with every key's default value.
#[derive(Debug)]
pub struct MemoryStore {
    values: RwLock<HashMap<StoreKey, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let values = StoreKey::ALL
            .iter()
            .map(|key| (*key, key.default_value()))
            .collect();
        Self {
            values: RwLock::new(values),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> DomainError {
    DomainError::Storage("In-memory store lock poisoned".to_string())
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Value, DomainError> {
        let values = self.values.read().map_err(|_| poisoned())?;
        Ok(values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_value()))
    }

    async fn set(&self, key: StoreKey, value: Value) -> Result<(), DomainError> {
        let mut values = self.values.write().map_err(|_| poisoned())?;
        values.insert(key, value);
        Ok(())
    }

    fn active_tier(&self) -> StorageTier {
        StorageTier::Memory
    }
}
