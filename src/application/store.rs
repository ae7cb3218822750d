// src/application/store.rs
use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::DomainError;

/// Logical keys of the key-value store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Flashcards,
    Counters,
}

impl StoreKey {
    pub const ALL: [StoreKey; 2] = [StoreKey::Flashcards, StoreKey::Counters];

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Flashcards => "flashcards",
            StoreKey::Counters => "counters",
        }
    }

    /// Value returned for a key that has never been written.
    pub fn default_value(&self) -> Value {
        match self {
            StoreKey::Flashcards => Value::Array(Vec::new()),
            StoreKey::Counters => json!({ "flashcardId": 1, "setId": 1 }),
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which storage tier serves operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    Primary,
    Memory,
}

/// Port to the key-value store holding flashcards and counters.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Stored JSON value, or the key's default when nothing is stored.
    async fn get(&self, key: StoreKey) -> Result<Value, DomainError>;

    async fn set(&self, key: StoreKey, value: Value) -> Result<(), DomainError>;

    fn active_tier(&self) -> StorageTier;

    /// Release the store. Operations after `close` may fail.
    async fn close(&self) -> Result<(), DomainError> {
        Ok(())
    }
}

pub(crate) async fn load<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: StoreKey,
) -> Result<T, DomainError> {
    let value = store.get(key).await?;
    Ok(serde_json::from_value(value)?)
}

pub(crate) async fn save<T: Serialize + ?Sized>(
    store: &dyn KeyValueStore,
    key: StoreKey,
    value: &T,
) -> Result<(), DomainError> {
    store.set(key, serde_json::to_value(value)?).await
}
