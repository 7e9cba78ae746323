//! # Ports Module
//!
//! Hexagonal boundaries of the coordinator.

pub mod inbound;
pub mod outbound;

pub use inbound::CoordinatorApi;
pub use outbound::{
    AdapterError, AdapterInitOptions, LoginParams, Provider, SharedAdapter, SharedProvider,
    StorageError, StorageGate, WalletAdapter,
};
