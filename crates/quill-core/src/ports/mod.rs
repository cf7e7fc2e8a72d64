//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod clock;
mod notifier;
mod storage;

pub use clock::Clock;
pub use notifier::Notifier;
pub use storage::{KeyValueStore, StorageError};
