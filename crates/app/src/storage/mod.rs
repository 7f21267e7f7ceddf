//! Durable key-value storage surviving restarts.

use mockall::automock;

mod errors;
mod file;
mod memory;

pub use errors::StoreError;
pub use file::FileStore;
pub use memory::MemoryStore;

/// String key-value persistence.
///
/// Calls are synchronous: a write has completed when `set` returns, so
/// writes issued in sequence land in that order.
#[automock]
pub trait DurableStore: Send + Sync {
    /// Reads a value, `None` if the key was never written or was removed.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Deletes a value. Removing an absent key succeeds.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}
