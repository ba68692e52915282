//! Durable key-value storage used to persist registry state.
//!
//! The registry only needs a string-by-key primitive; the persisted layout on top of
//! it lives in [`crate::registry`]. Two implementations are provided:
//!
//! * [`MemoryStore`]: process-local, for tests and ephemeral clients.
//! * [`JsonFileStore`]: a single JSON document on disk.

use async_trait::async_trait;

mod errors;
pub use errors::StoreError;

mod file;
pub use file::JsonFileStore;

mod memory;
pub use memory::MemoryStore;

/// A durable string-by-key store.
///
/// Implementations must be `Send + Sync`; the registry writes to the store from a
/// background task while queries run elsewhere.
#[async_trait]
pub trait DurableStore: Send + Sync {
    /// Read the value stored under `key`, or `None` if the key was never written.
    async fn get_string(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the value stored under `key`.
    async fn set_string(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
