//! Persistence gateway - whole-collection load/save of posts in one storage slot.
//!
//! Failures never reach the caller: a failed save is logged and the in-memory
//! state stays authoritative, a failed load yields an empty collection.

use std::sync::Arc;

use quill_core::Post;
use quill_core::ports::{KeyValueStore, StorageError};

/// Slot the post collection is stored under.
pub const DEFAULT_STORAGE_KEY: &str = "scheduled_posts";

/// Persistence errors, reported through logs only.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Storage failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// Overwrite the slot with `posts`. A failed write is logged and the
    /// slot keeps its previous value.
    pub fn save(&self, posts: &[Post]) {
        match self.try_save(posts) {
            Ok(()) => {
                tracing::debug!(key = %self.key, count = posts.len(), "Posts saved");
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to save posts");
            }
        }
    }

    /// Read the slot. Absent, blank or unreadable content loads as empty.
    pub fn load(&self) -> Vec<Post> {
        match self.try_load() {
            Ok(posts) => {
                tracing::debug!(key = %self.key, count = posts.len(), "Posts loaded");
                posts
            }
            Err(e) => {
                tracing::error!(key = %self.key, error = %e, "Failed to load posts");
                Vec::new()
            }
        }
    }

    fn try_save(&self, posts: &[Post]) -> Result<(), PersistenceError> {
        let json = serde_json::to_string(posts)?;
        self.store.set(&self.key, &json)?;
        Ok(())
    }

    fn try_load(&self) -> Result<Vec<Post>, PersistenceError> {
        match self.store.get(&self.key)? {
            Some(raw) if !raw.trim().is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(Vec::new()),
        }
    }
}
