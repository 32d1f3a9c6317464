pub mod manager;
pub mod registry;
pub mod persistence;

pub use manager::{StorageManager, RegistryConfig};
pub use registry::{FingerprintRegistry, FingerprintEntry, DEFAULT_LIST_LIMIT};
pub use persistence::{JsonPersistence, RegistrySnapshot};
