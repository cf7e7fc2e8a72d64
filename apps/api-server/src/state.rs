//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::KeyValueStore;
use quill_infra::{InMemoryKeyValueStore, LogNotifier, SystemClock};

#[cfg(feature = "fs")]
use quill_infra::FileKeyValueStore;

use crate::config::AppConfig;
use crate::controller::Controller;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<Controller>,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub fn new(config: &AppConfig) -> Self {
        let storage = Self::storage(config);
        let controller = Controller::new(
            storage,
            Arc::new(SystemClock),
            Arc::new(LogNotifier),
            &config.pipeline,
        );

        tracing::info!("Application state initialized");

        Self {
            controller: Arc::new(controller),
        }
    }

    #[cfg(feature = "fs")]
    fn storage(config: &AppConfig) -> Arc<dyn KeyValueStore> {
        let Some(dir) = &config.data_dir else {
            tracing::warn!("QUILL_DATA_DIR not set. Posts are kept in memory only.");
            return Arc::new(InMemoryKeyValueStore::new());
        };

        match FileKeyValueStore::open(dir) {
            Ok(store) => {
                tracing::info!(dir = %dir.display(), "Using file storage");
                Arc::new(store)
            }
            Err(e) => {
                tracing::error!(
                    "Failed to open data directory {}: {}. Using in-memory fallback.",
                    dir.display(),
                    e
                );
                Arc::new(InMemoryKeyValueStore::new())
            }
        }
    }

    #[cfg(not(feature = "fs"))]
    fn storage(_config: &AppConfig) -> Arc<dyn KeyValueStore> {
        tracing::info!("Running without fs feature - using in-memory storage");
        Arc::new(InMemoryKeyValueStore::new())
    }
}
