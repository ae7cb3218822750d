// src/infrastructure/fallback.rs
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::application::{KeyValueStore, StorageTier, StoreKey};
use crate::domain::DomainError;
use crate::infrastructure::config::StoreConfig;
use crate::infrastructure::{MemoryStore, RestStore};

/// Two-tier store: an optional primary, backed by process memory.
///
/// Degradation is tracked per key. Once a key has been read from memory, its
/// writes stay in memory until a read of that key succeeds on the primary
/// again, so a value derived from the memory tier never replaces primary data.
/// The tiers are never reconciled; after an outage they may hold different
/// data.
pub struct FallbackStore {
    primary: Option<Arc<dyn KeyValueStore>>,
    memory: MemoryStore,
    degraded: [AtomicBool; StoreKey::ALL.len()],
}

fn slot(key: StoreKey) -> usize {
    match key {
        StoreKey::Flashcards => 0,
        StoreKey::Counters => 1,
    }
}

impl FallbackStore {
    pub fn memory_only() -> Self {
        Self {
            primary: None,
            memory: MemoryStore::new(),
            degraded: Default::default(),
        }
    }

    pub fn with_primary(primary: Arc<dyn KeyValueStore>) -> Self {
        Self {
            primary: Some(primary),
            memory: MemoryStore::new(),
            degraded: Default::default(),
        }
    }

    /// Build the store handle for the process from configuration.
    ///
    /// An unreachable primary is not fatal; the store starts degraded.
    pub async fn from_config(config: &StoreConfig) -> Result<Self> {
        let Some(url) = config.url.as_deref() else {
            info!("No external store configured, data is kept in memory only");
            return Ok(Self::memory_only());
        };

        let primary = RestStore::new(url, config.token.clone(), config.timeout())
            .with_context(|| format!("Failed to create client for store at {}", url))?;

        let store = match primary.ping().await {
            Ok(()) => {
                info!(url = %primary.url(), "Connected to external store");
                Self::with_primary(Arc::new(primary))
            }
            Err(e) => {
                warn!(url = %primary.url(), error = %e, "External store unreachable, serving from memory until it recovers");
                let store = Self::with_primary(Arc::new(primary));
                for flag in &store.degraded {
                    flag.store(true, Ordering::Release);
                }
                store
            }
        };
        Ok(store)
    }

    /// Whether any key is currently served from memory.
    pub fn is_degraded(&self) -> bool {
        self.degraded.iter().any(|flag| flag.load(Ordering::Acquire))
    }

    fn is_key_degraded(&self, key: StoreKey) -> bool {
        self.degraded[slot(key)].load(Ordering::Acquire)
    }

    fn record_failure(&self, operation: &str, key: StoreKey, error: &DomainError) {
        let was_degraded = self.is_degraded();
        self.degraded[slot(key)].store(true, Ordering::Release);
        if was_degraded {
            debug!(operation, %key, %error, "Primary store still failing, using memory");
        } else {
            warn!(operation, %key, %error, "Primary store failed, falling back to memory");
        }
    }

    fn record_recovery(&self, key: StoreKey) {
        if self.degraded[slot(key)].swap(false, Ordering::AcqRel) {
            info!(%key, "Primary store recovered; data written to memory meanwhile is not copied back");
        }
    }
}

#[async_trait]
impl KeyValueStore for FallbackStore {
    async fn get(&self, key: StoreKey) -> Result<Value, DomainError> {
        if let Some(primary) = &self.primary {
            match primary.get(key).await {
                Ok(value) => {
                    self.record_recovery(key);
                    return Ok(value);
                }
                Err(e) => self.record_failure("get", key, &e),
            }
        }
        self.memory.get(key).await
    }

    /// Writes reach the primary only while the key's last read came from it.
    async fn set(&self, key: StoreKey, value: Value) -> Result<(), DomainError> {
        if let Some(primary) = &self.primary {
            if self.is_key_degraded(key) {
                debug!(%key, "Key is degraded, keeping write in memory");
            } else {
                match primary.set(key, value.clone()).await {
                    Ok(()) => return Ok(()),
                    Err(e) => self.record_failure("set", key, &e),
                }
            }
        }
        self.memory.set(key, value).await
    }

    fn active_tier(&self) -> StorageTier {
        match &self.primary {
            Some(_) if !self.is_degraded() => StorageTier::Primary,
            _ => StorageTier::Memory,
        }
    }

    async fn close(&self) -> Result<(), DomainError> {
        if let Some(primary) = &self.primary {
            primary.close().await?;
        }
        Ok(())
    }
}
