//! # Inbound Ports
//!
//! The API callers use to drive the coordinator once adapters are
//! registered.

use crate::domain::CoordinatorError;
use crate::ports::outbound::{LoginParams, SharedProvider};
use async_trait::async_trait;
use shared_types::{AdapterStatus, UserInfo};

/// Connection lifecycle API - inbound port.
#[async_trait]
pub trait CoordinatorApi: Send + Sync {
    /// Initialize every registered adapter. One-time.
    async fn init(&self) -> Result<(), CoordinatorError>;

    /// Start a login through the named adapter.
    ///
    /// Status changes arrive through events, not through this return value.
    async fn connect_to(&self, adapter: &str, params: LoginParams) -> Result<(), CoordinatorError>;

    /// End the current session.
    async fn logout(&self) -> Result<(), CoordinatorError>;

    /// User snapshot from the connected adapter.
    async fn get_user_info(&self) -> Result<UserInfo, CoordinatorError>;

    /// Forget the remembered adapter.
    fn clear_cache(&self);

    /// Current status.
    fn status(&self) -> AdapterStatus;

    /// Provider of the connected adapter.
    fn provider(&self) -> Option<SharedProvider>;

    /// Name of the connected adapter.
    fn connected_adapter_name(&self) -> Option<String>;

    /// Adapter remembered for silent reconnection.
    fn cached_adapter(&self) -> Option<String>;
}
