/// Key-value storage trait - abstraction over the durable slot posts live in.
///
/// Calls are synchronous and writes overwrite the whole value.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Storage operation errors.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),
}
