use std::sync::Arc;
use std::time::Duration;

use flashdeck::application::{Catalog, KeyValueStore, StorageTier, StoreKey};
use flashdeck::infrastructure::config::StoreConfig;
use flashdeck::infrastructure::{FallbackStore, RestStore};
use flashdeck::util::testing::MockKeyValueStore;
use serde_json::json;

#[tokio::test]
async fn given_unreachable_store_url_when_building_from_config_then_starts_in_memory() {
    // Arrange
    let config = StoreConfig {
        url: Some("http://127.0.0.1:1".to_string()),
        token: Some("secret".to_string()),
        timeout_secs: 1,
    };

    // Act
    let store = FallbackStore::from_config(&config).await.unwrap();

    // Assert
    assert!(store.is_degraded());
    assert_eq!(store.active_tier(), StorageTier::Memory);
}

#[tokio::test]
async fn given_unreachable_primary_when_using_catalog_then_operations_still_succeed() {
    // Arrange
    let primary = RestStore::new("http://127.0.0.1:1/", None, Duration::from_secs(1)).unwrap();
    let store = Arc::new(FallbackStore::with_primary(Arc::new(primary)));
    let catalog = Catalog::new(store.clone());

    // Act
    catalog.ensure_seeded().await;
    let sets = catalog.sets().list().await.unwrap();

    // Assert
    assert_eq!(sets.len(), 3);
    assert_eq!(catalog.storage_tier(), StorageTier::Memory);
}

#[tokio::test]
async fn given_no_url_when_building_from_config_then_memory_only_without_degradation() {
    // Arrange
    let config = StoreConfig {
        url: None,
        token: None,
        timeout_secs: 5,
    };

    // Act
    let store = FallbackStore::from_config(&config).await.unwrap();
    store.set(StoreKey::Flashcards, json!([])).await.unwrap();

    // Assert
    assert!(!store.is_degraded());
    assert_eq!(store.active_tier(), StorageTier::Memory);
    assert_eq!(store.get(StoreKey::Flashcards).await.unwrap(), json!([]));
}

#[test]
fn given_non_http_url_when_creating_rest_store_then_fails() {
    // Act
    let result = RestStore::new("redis://localhost:6379", None, Duration::from_secs(1));

    // Assert
    assert!(result.is_err());
}

#[tokio::test]
async fn given_transient_read_failure_when_seeding_then_primary_data_survives() {
    // Arrange
    let cards: Vec<_> = (1..=5)
        .map(|id| {
            json!({
                "id": id,
                "front": format!("Q{id}"),
                "back": format!("A{id}"),
                "set": "Mine",
                "createdAt": "2024-05-01T10:00:00Z",
                "reviewCount": 0
            })
        })
        .collect();
    let primary = Arc::new(
        MockKeyValueStore::builder()
            .with_value(StoreKey::Flashcards, json!(cards))
            .with_value(StoreKey::Counters, json!({ "flashcardId": 6, "setId": 1 }))
            .failing_gets(1)
            .build(),
    );
    let catalog = Catalog::new(Arc::new(FallbackStore::with_primary(primary.clone())));

    // Act
    catalog.ensure_seeded().await;

    // Assert
    assert_eq!(primary.stored(StoreKey::Flashcards), Some(json!(cards)));
    assert_eq!(
        primary.stored(StoreKey::Counters),
        Some(json!({ "flashcardId": 6, "setId": 1 }))
    );
    let listed = catalog.flashcards().list().await.unwrap();
    assert_eq!(listed.len(), 5);
    assert!(listed.iter().all(|card| card.set == "Mine"));
    assert_eq!(catalog.storage_tier(), StorageTier::Primary);
}

#[tokio::test]
async fn given_recovered_primary_when_creating_card_then_continues_primary_ids() {
    // Arrange
    let primary = Arc::new(
        MockKeyValueStore::builder()
            .with_value(StoreKey::Counters, json!({ "flashcardId": 6, "setId": 1 }))
            .failing_gets(1)
            .build(),
    );
    let catalog = Catalog::new(Arc::new(FallbackStore::with_primary(primary.clone())));
    catalog.ensure_seeded().await;

    // Act
    let card = catalog
        .flashcards()
        .create(flashdeck::domain::NewFlashcard::new("Q", "A"))
        .await
        .unwrap();

    // Assert
    assert_eq!(card.id, 6);
    assert_eq!(
        primary.stored(StoreKey::Counters),
        Some(json!({ "flashcardId": 7, "setId": 1 }))
    );
}
