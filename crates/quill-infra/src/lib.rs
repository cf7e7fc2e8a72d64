//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`, plus the
//! persistence gateway and the promotion scheduler built on top of them.
//!
//! ## Feature Flags
//!
//! - `fs` (default) - durable file-backed key-value store

pub mod clock;
pub mod notify;
pub mod persistence;
pub mod scheduler;
pub mod storage;

// Re-exports
pub use clock::{AnchoredClock, SystemClock};
pub use notify::{ChannelNotifier, LogNotifier, Notification};
pub use persistence::{DEFAULT_STORAGE_KEY, PersistenceError, PersistenceGateway};
pub use scheduler::{PostsChanged, PromotionScheduler, SchedulerConfig, SharedStore};
pub use storage::InMemoryKeyValueStore;

#[cfg(feature = "fs")]
pub use storage::FileKeyValueStore;
