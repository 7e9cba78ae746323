//! Storage Adapters
//!
//! Implementations of the `StorageGate` trait.

mod file;
mod memory;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
