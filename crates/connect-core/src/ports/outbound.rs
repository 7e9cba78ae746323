//! # Outbound Ports
//!
//! Traits for the collaborators the coordinator drives: adapters, the
//! providers they expose, and the storage gate that remembers the last
//! connected adapter.

use async_trait::async_trait;
use shared_bus::AdapterEventEmitter;
use shared_types::{AdapterNamespace, ChainConfig, ChainNamespace, StorageKind, UserInfo};
use std::sync::Arc;
use thiserror::Error;

/// Errors returned by adapter and provider calls.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdapterError {
    /// The adapter has not finished its own initialization.
    #[error("Adapter is not ready yet: {0}")]
    NotReady(String),

    /// Initialization failed.
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    /// Connection attempt failed.
    #[error("Failed to connect with wallet: {0}")]
    ConnectionFailed(String),

    /// Disconnect failed.
    #[error("Failed to disconnect from wallet: {0}")]
    DisconnectionFailed(String),

    /// The user dismissed the login window.
    #[error("Wallet popup has been closed by the user")]
    UserClosedPopup,

    /// The adapter holds no authenticated user.
    #[error("User not logged in: {0}")]
    UserInfoUnavailable(String),

    /// A provider request failed.
    #[error("Provider request failed: {0}")]
    Rpc(String),
}

impl AdapterError {
    /// Stable numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::NotReady(_) => 5003,
            Self::InitializationFailed(_) => 5000,
            Self::Rpc(_) => 5010,
            Self::ConnectionFailed(_) => 5111,
            Self::DisconnectionFailed(_) => 5112,
            Self::UserClosedPopup => 5114,
            Self::UserInfoUnavailable(_) => 5115,
        }
    }
}

/// Options passed to an adapter's own initialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AdapterInitOptions {
    /// Try to restore the previous session silently.
    pub auto_connect: bool,
}

/// Opaque, adapter specific login parameters.
pub type LoginParams = Option<serde_json::Value>;

/// Connection handle exposed by a connected adapter.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Hex chain id the provider is talking to.
    fn chain_id(&self) -> String;

    /// JSON-RPC style request.
    async fn request(
        &self,
        method: &str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, AdapterError>;
}

/// Shared provider handle.
pub type SharedProvider = Arc<dyn Provider>;

/// Contract every login / wallet adapter implements.
///
/// Adapters report lifecycle changes through the emitter handed to
/// [`WalletAdapter::subscribe`]; return values of `connect`/`disconnect`
/// only report whether the call itself went through.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    /// Unique name used as the registry key.
    fn name(&self) -> &str;

    /// Declared namespace capability.
    fn adapter_namespace(&self) -> AdapterNamespace;

    /// Concrete namespace a multi-chain adapter has committed to, if any.
    fn current_chain_namespace(&self) -> Option<ChainNamespace> {
        None
    }

    /// Chain configuration currently assigned.
    fn chain_config(&self) -> Option<ChainConfig>;

    /// Assign a chain configuration.
    fn set_chain_config(&self, config: ChainConfig);

    /// Attach the emitter lifecycle events must be sent through.
    fn subscribe(&self, emitter: AdapterEventEmitter);

    /// Adapter specific initialization.
    async fn init(&self, options: AdapterInitOptions) -> Result<(), AdapterError>;

    /// Start a login.
    async fn connect(&self, params: LoginParams) -> Result<(), AdapterError>;

    /// End the session.
    async fn disconnect(&self) -> Result<(), AdapterError>;

    /// Whatever the adapter knows about the logged in user.
    async fn get_user_info(&self) -> Result<UserInfo, AdapterError>;

    /// Connection handle, present while connected.
    fn provider(&self) -> Option<SharedProvider>;
}

/// Shared adapter handle.
pub type SharedAdapter = Arc<dyn WalletAdapter>;

/// Storage errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    /// The requested storage area cannot be used.
    #[error("{0} storage is unavailable")]
    Unavailable(StorageKind),

    /// Underlying I/O failed.
    #[error("Storage I/O error: {0}")]
    Io(String),

    /// Stored data could not be decoded.
    #[error("Stored data is corrupted: {0}")]
    Corrupted(String),
}

/// Availability checked key/value persistence.
///
/// Implementations use interior mutability; the coordinator shares one
/// instance behind an `Arc`.
pub trait StorageGate: Send + Sync {
    /// Whether `kind` can currently be used.
    fn is_available(&self, kind: StorageKind) -> bool;

    /// Read a value.
    fn get(&self, kind: StorageKind, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value.
    fn set(&self, kind: StorageKind, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Deleting a missing key succeeds.
    fn remove(&self, kind: StorageKind, key: &str) -> Result<(), StorageError>;
}
