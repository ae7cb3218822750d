pub mod config;
pub mod fallback;
pub mod memory;
pub mod rest;

pub use config::Config;
pub use fallback::FallbackStore;
pub use memory::MemoryStore;
pub use rest::{RestStore, RestStoreError};
