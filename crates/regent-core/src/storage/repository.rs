//! Key-value store trait.

use async_trait::async_trait;

use crate::error::Result;

/// A flat, durable string-to-string map.
///
/// Values are opaque text; structured slices are serialized by the caller.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads a value, `None` when the key is absent.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Writes a value, replacing any previous one.
    async fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removes a key. Removing an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;

    /// Removes several keys in one write.
    ///
    /// The default implementation removes them one by one.
    async fn remove_many(&self, keys: &[&str]) -> Result<()> {
        for key in keys {
            self.remove(key).await?;
        }
        Ok(())
    }

    /// Lists every key currently stored, in no particular order.
    async fn keys(&self) -> Result<Vec<String>>;
}
