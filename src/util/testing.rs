// src/util/testing.rs

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::{KeyValueStore, StorageTier, StoreKey};
use crate::domain::DomainError;

/// Configurable in-process store for testing code that depends on KeyValueStore
///
/// Counts calls, and can be switched into a failing mode to stand in for an
/// unreachable external store.
///
/// # Examples
///
/// ```
/// use flashdeck::application::StoreKey;
/// use flashdeck::util::testing::MockKeyValueStore;
/// use serde_json::json;
///
/// let mock = MockKeyValueStore::builder()
///     .with_value(StoreKey::Flashcards, json!([]))
///     .failing()
///     .build();
/// assert_eq!(mock.get_calls(), 0);
/// ```
pub struct MockKeyValueStore {
    values: Mutex<HashMap<StoreKey, Value>>,
    failing: AtomicBool,
    failing_gets: AtomicUsize,
    get_calls: AtomicUsize,
    set_calls: AtomicUsize,
}

impl MockKeyValueStore {
    pub fn builder() -> MockKeyValueStoreBuilder {
        MockKeyValueStoreBuilder::new()
    }

    /// Switch failure mode on or off after construction
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    /// Value currently held for `key`, ignoring failure mode
    pub fn stored(&self, key: StoreKey) -> Option<Value> {
        self.values.lock().ok().and_then(|v| v.get(&key).cloned())
    }

    fn check_failing(&self) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(DomainError::Storage("mock store unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn poisoned() -> DomainError {
        DomainError::Storage("mock store lock poisoned".to_string())
    }
}

#[async_trait]
impl KeyValueStore for MockKeyValueStore {
    async fn get(&self, key: StoreKey) -> Result<Value, DomainError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        if self
            .failing_gets
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
        {
            return Err(DomainError::Storage("mock store read timed out".to_string()));
        }
        let values = self.values.lock().map_err(|_| Self::poisoned())?;
        Ok(values
            .get(&key)
            .cloned()
            .unwrap_or_else(|| key.default_value()))
    }

    async fn set(&self, key: StoreKey, value: Value) -> Result<(), DomainError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        let mut values = self.values.lock().map_err(|_| Self::poisoned())?;
        values.insert(key, value);
        Ok(())
    }

    fn active_tier(&self) -> StorageTier {
        StorageTier::Primary
    }
}

/// Builder for MockKeyValueStore
///
/// Provides a fluent interface for configuring mock behavior.
pub struct MockKeyValueStoreBuilder {
    values: HashMap<StoreKey, Value>,
    failing: bool,
    failing_gets: usize,
}

impl MockKeyValueStoreBuilder {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
            failing: false,
            failing_gets: 0,
        }
    }

    /// Pre-store a value for a key
    pub fn with_value(mut self, key: StoreKey, value: Value) -> Self {
        self.values.insert(key, value);
        self
    }

    /// Make every get/set fail with a storage error
    pub fn failing(mut self) -> Self {
        self.failing = true;
        self
    }

    /// Fail only the next `count` gets, like a transient outage
    pub fn failing_gets(mut self, count: usize) -> Self {
        self.failing_gets = count;
        self
    }

    pub fn build(self) -> MockKeyValueStore {
        MockKeyValueStore {
            values: Mutex::new(self.values),
            failing: AtomicBool::new(self.failing),
            failing_gets: AtomicUsize::new(self.failing_gets),
            get_calls: AtomicUsize::new(0),
            set_calls: AtomicUsize::new(0),
        }
    }
}

impl Default for MockKeyValueStoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn init_test_setup() -> Result<()> {
    // Set up logging first
    setup_test_logging();

    info!("Test Setup complete");
    Ok(())
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["hyper", "reqwest", "mio", "tower"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}
