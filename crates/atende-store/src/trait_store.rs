use crate::error::Result;

/// String key-value storage shared by session and lead overrides
///
/// Implementations are injected as `Arc<dyn KeyValueStore>`; writes are
/// last-writer-wins with no cross-process locking.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deleting a missing key is not an error
    fn delete(&self, key: &str) -> Result<()>;

    /// Keys starting with `prefix`, sorted
    fn keys(&self, prefix: &str) -> Result<Vec<String>>;
}
