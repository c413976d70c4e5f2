// Adapters layer: concrete implementations of the domain ports.

pub mod memory_store;
pub mod narrative;
pub mod storage;

pub use memory_store::InMemoryRateLimitStore;
pub use narrative::{narrator_from_config, DeepSeekNarrator, DisabledNarrator};
pub use storage::LocalStorage;
