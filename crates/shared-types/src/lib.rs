//! # Shared Types Crate
//!
//! Vocabulary shared by the connection coordinator, the lifecycle event bus
//! and every adapter implementation.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: namespaces, statuses and chain parameters
//!   are defined once here.
//! - **Wire Stable**: every enum serializes to the lowercase names adapters
//!   and persisted state already use.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod chain_config;
pub mod entities;

pub use chain_config::*;
pub use entities::*;
