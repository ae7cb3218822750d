// src/application/mod.rs
pub mod bootstrap;
pub mod catalog;
pub mod flashcard_repository;
pub mod id_generator;
pub mod set_catalog;
pub mod store;

pub use bootstrap::Bootstrapper;
pub use catalog::Catalog;
pub use flashcard_repository::FlashcardRepository;
pub use id_generator::IdGenerator;
pub use set_catalog::{derive_sets, SetCatalog};
pub use store::{KeyValueStore, StorageTier, StoreKey};
