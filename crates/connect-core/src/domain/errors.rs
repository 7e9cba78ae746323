//! # Domain Errors
//!
//! Error types surfaced by the coordinator.
//!
//! Codes are stable across releases so callers can match on them without
//! parsing messages. 50xx codes are registration/initialization problems,
//! 51xx codes are login/session problems.

use crate::ports::outbound::AdapterError;
use shared_types::ChainNamespace;
use thiserror::Error;

/// Broad grouping of a coordinator error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Registration and init ordering or structure.
    Initialization,
    /// Session operations.
    Login,
}

/// Coordinator error types.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    /// A connection attempt is already in flight.
    #[error("Already pending connection")]
    AlreadyConnecting,

    /// A session is already established.
    #[error("Already connected")]
    AlreadyConnected,

    /// Initialization already happened; the registration window is closed.
    #[error("Coordinator is already initialized, so no more adapters can be added")]
    AlreadyInitialized,

    /// Two adapters from mutually exclusive families.
    #[error("Either {existing} or {incoming} can be used, {existing} adapter already exists")]
    MutualExclusivityViolation {
        /// Adapter already registered
        existing: String,
        /// Adapter being registered
        incoming: String,
    },

    /// Adapter name already registered.
    #[error("Wallet adapter for {0} already exists")]
    DuplicateAdapter(String),

    /// Adapter cannot serve the configured namespace.
    #[error("{adapter} wallet adapter belongs to {adapter_namespace} which is incompatible with currently used namespace: {expected}")]
    IncompatibleNamespace {
        /// Adapter name
        adapter: String,
        /// Namespace the adapter declared or committed to
        adapter_namespace: String,
        /// Coordinator namespace
        expected: ChainNamespace,
    },

    /// No adapter registered under this name.
    #[error("Please add wallet adapter for {0} wallet, before connecting")]
    AdapterNotFound(String),

    /// Operation needs an established session.
    #[error("No wallet is connected")]
    NotConnected,

    /// A delegated adapter call failed.
    #[error("Adapter {adapter} failed: {source}")]
    Adapter {
        /// Adapter name
        adapter: String,
        /// Underlying failure
        #[source]
        source: AdapterError,
    },
}

impl CoordinatorError {
    /// Stable numeric code.
    pub fn code(&self) -> u16 {
        match self {
            Self::AlreadyConnecting | Self::AlreadyConnected | Self::AlreadyInitialized => 5003,
            Self::MutualExclusivityViolation { .. } => 5000,
            Self::DuplicateAdapter(_) => 5007,
            Self::IncompatibleNamespace { .. } => 5006,
            Self::AdapterNotFound(_) => 5001,
            Self::NotConnected => 5113,
            Self::Adapter { source, .. } => source.code(),
        }
    }

    /// Category derived from the code.
    pub fn category(&self) -> ErrorCategory {
        if self.code() >= 5100 {
            ErrorCategory::Login
        } else {
            ErrorCategory::Initialization
        }
    }
}

/// Result type for coordinator operations.
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incompatible_namespace_message() {
        let err = CoordinatorError::IncompatibleNamespace {
            adapter: "phantom".to_string(),
            adapter_namespace: "solana".to_string(),
            expected: ChainNamespace::Eip155,
        };
        let msg = err.to_string();
        assert!(msg.contains("phantom"));
        assert!(msg.contains("solana"));
        assert!(msg.contains("eip155"));
        assert_eq!(err.code(), 5006);
    }

    #[test]
    fn test_categories() {
        assert_eq!(
            CoordinatorError::DuplicateAdapter("metamask".to_string()).category(),
            ErrorCategory::Initialization
        );
        assert_eq!(CoordinatorError::NotConnected.category(), ErrorCategory::Login);
        assert_eq!(CoordinatorError::AlreadyInitialized.code(), 5003);
    }

    #[test]
    fn test_adapter_error_code_passthrough() {
        let err = CoordinatorError::Adapter {
            adapter: "openlogin".to_string(),
            source: AdapterError::UserClosedPopup,
        };
        assert_eq!(err.code(), 5114);
        assert_eq!(err.category(), ErrorCategory::Login);
        assert!(err.to_string().contains("openlogin"));
    }

    #[test]
    fn test_mutual_exclusivity_message() {
        let err = CoordinatorError::MutualExclusivityViolation {
            existing: "openlogin".to_string(),
            incoming: "customAuth".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Either openlogin or customAuth can be used, openlogin adapter already exists"
        );
    }
}
