//! Key-value storage implementations - in-memory and file-backed.

mod memory;

#[cfg(feature = "fs")]
mod file;

pub use memory::InMemoryKeyValueStore;

#[cfg(feature = "fs")]
pub use file::FileKeyValueStore;
