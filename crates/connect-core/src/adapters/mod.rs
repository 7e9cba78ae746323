//! # Adapters Module
//!
//! Concrete implementations of outbound ports.

pub mod storage;

pub use storage::{FileStorage, InMemoryStorage};
