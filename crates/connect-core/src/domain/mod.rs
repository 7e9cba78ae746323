//! # Domain Module
//!
//! Core domain types for the connection coordinator.

pub mod errors;
pub mod state;

pub use errors::*;
pub use state::{CacheAction, ConnectionState, Transition};
