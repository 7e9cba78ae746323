//! # Connect Core
//!
//! Adapter registry and connection lifecycle coordinator.
//!
//! A [`Coordinator`] owns a set of pluggable login / wallet adapters, folds
//! their lifecycle events into one authoritative [`AdapterStatus`] and
//! provider handle, and remembers the last adapter that connected so the
//! next process can reconnect it silently.
//!
//! ## Status Machine
//!
//! ```text
//!              init()
//! NotReady ─────────────→ Ready ←──────────── disconnected
//!                           │                      ↑
//!                      connecting                  │
//!                           ↓                      │
//!                      Connecting ──connected──→ Connected
//!                           │                      │
//!                        errored                errored
//!                           ↓                      ↓
//!                        Errored ←─────────────────┘
//! ```
//!
//! ## Crate Structure (Hexagonal Architecture)
//!
//! - `domain/` - Connection state machine and error types
//! - `ports/` - `CoordinatorApi` (inbound), adapter / provider / storage traits (outbound)
//! - `adapters/` - In-memory and file backed storage gates
//! - `registry.rs` - Registration rules
//! - `session_cache.rs` - Remembered adapter
//! - `service.rs` - The coordinator itself
//!
//! ## Usage
//!
//! ```ignore
//! use connect_core::{Coordinator, CoordinatorApi, CoreOptions, InMemoryStorage};
//! use shared_types::ChainNamespace;
//! use std::sync::Arc;
//!
//! let coordinator = Coordinator::new(
//!     CoreOptions::new(ChainNamespace::Eip155),
//!     Arc::new(InMemoryStorage::new()),
//! )?;
//! coordinator.register(metamask)?.register(torus)?;
//! coordinator.init().await?;
//! coordinator.connect_to("metamask", None).await?;
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod registry;
pub mod service;
pub mod session_cache;
pub mod telemetry;

/// Test doubles (MockAdapter, MockProvider, async helpers)
/// Requires feature: `test-utils`
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export key types for convenience
pub use adapters::{FileStorage, InMemoryStorage};
pub use config::{ConfigError, CoreOptions};
pub use domain::{CoordinatorError, CoordinatorResult, ErrorCategory};
pub use ports::inbound::CoordinatorApi;
pub use ports::outbound::{
    AdapterError, AdapterInitOptions, LoginParams, Provider, SharedAdapter, SharedProvider,
    StorageError, StorageGate, WalletAdapter,
};
pub use registry::AdapterRegistry;
pub use service::Coordinator;
pub use session_cache::{SessionCache, ADAPTER_CACHE_KEY};
pub use telemetry::{init_logging, LogConfig, TelemetryError};

// Re-export the vocabulary callers need alongside the coordinator
pub use shared_bus::{AdapterEvent, AdapterEventEmitter, ConnectedEventData, EventFilter, EventKind};
pub use shared_types::{AdapterNamespace, AdapterStatus, ChainNamespace, StorageKind, UserInfo};
