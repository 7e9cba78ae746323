//! # Core Domain Entities
//!
//! Defines the vocabulary shared by the coordinator, the event bus and every
//! adapter implementation.
//!
//! ## Clusters
//!
//! - **Namespaces**: `ChainNamespace`, `AdapterNamespace`
//! - **Lifecycle**: `AdapterStatus`
//! - **Identity**: `UserInfo`, well-known adapter names
//! - **Persistence**: `StorageKind`

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// =============================================================================
// CLUSTER A: NAMESPACES
// =============================================================================

/// Network family a coordinator operates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChainNamespace {
    /// EVM-compatible chains (EIP-155 chain ids).
    Eip155,
    /// Solana clusters.
    Solana,
    /// Any other network; no built-in chain defaults exist for it.
    Other,
}

impl ChainNamespace {
    /// Wire name of the namespace.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Eip155 => "eip155",
            Self::Solana => "solana",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for ChainNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a namespace or storage kind string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseEntityError {
    /// What was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

impl FromStr for ChainNamespace {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "eip155" => Ok(Self::Eip155),
            "solana" => Ok(Self::Solana),
            "other" => Ok(Self::Other),
            _ => Err(ParseEntityError {
                kind: "chain namespace",
                value: s.to_string(),
            }),
        }
    }
}

/// Capability tag declared by an adapter.
///
/// An adapter either serves exactly one chain namespace, or is multi-chain
/// and may later commit to a concrete namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AdapterNamespace {
    /// Bound to a single chain namespace.
    Chain(ChainNamespace),
    /// Able to serve any namespace.
    Multichain,
}

impl AdapterNamespace {
    /// Whether this adapter declares multi-chain capability.
    pub fn is_multichain(&self) -> bool {
        matches!(self, Self::Multichain)
    }
}

impl From<ChainNamespace> for AdapterNamespace {
    fn from(namespace: ChainNamespace) -> Self {
        Self::Chain(namespace)
    }
}

impl FromStr for AdapterNamespace {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("multichain") {
            return Ok(Self::Multichain);
        }
        s.parse::<ChainNamespace>().map(Self::Chain).map_err(|_| ParseEntityError {
            kind: "adapter namespace",
            value: s.to_string(),
        })
    }
}

impl TryFrom<String> for AdapterNamespace {
    type Error = ParseEntityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AdapterNamespace> for String {
    fn from(namespace: AdapterNamespace) -> Self {
        namespace.to_string()
    }
}

impl fmt::Display for AdapterNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain(ns) => write!(f, "{}", ns),
            Self::Multichain => f.write_str("multichain"),
        }
    }
}

// =============================================================================
// CLUSTER B: LIFECYCLE
// =============================================================================

/// Connection status of an adapter or of the coordinator as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterStatus {
    /// Registered but not yet initialized.
    #[default]
    NotReady,
    /// Initialized and able to connect.
    Ready,
    /// A connection attempt is in flight.
    Connecting,
    /// A session is established.
    Connected,
    /// The session ended.
    Disconnected,
    /// The last attempt failed. Recoverable through a new connection.
    Errored,
}

impl AdapterStatus {
    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotReady => "not_ready",
            Self::Ready => "ready",
            Self::Connecting => "connecting",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::Errored => "errored",
        }
    }

    /// True once initialization has happened (anything but `NotReady`).
    pub fn is_initialized(&self) -> bool {
        !matches!(self, Self::NotReady)
    }
}

impl fmt::Display for AdapterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CLUSTER C: IDENTITY
// =============================================================================

/// Well-known adapter names.
pub mod adapter_names {
    /// Hosted social login.
    pub const OPENLOGIN: &str = "openlogin";
    /// Self-hosted verifier login. Mutually exclusive with [`OPENLOGIN`].
    pub const CUSTOM_AUTH: &str = "customAuth";
    /// Injected EVM browser wallet.
    pub const METAMASK: &str = "metamask";
    /// Injected Solana wallet.
    pub const PHANTOM: &str = "phantom";
    /// Hosted EVM wallet.
    pub const TORUS_EVM: &str = "torus-evm";
    /// Hosted Solana wallet.
    pub const TORUS_SOLANA: &str = "torus-solana";
    /// QR-code bridge to mobile wallets.
    pub const WALLET_CONNECT_V1: &str = "wallet-connect-v1";
}

/// Snapshot of the logged-in user as reported by an adapter.
///
/// Adapters fill in whatever they know; every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserInfo {
    pub email: Option<String>,
    pub name: Option<String>,
    pub profile_image: Option<String>,
    pub aggregate_verifier: Option<String>,
    pub verifier: Option<String>,
    pub verifier_id: Option<String>,
    pub type_of_login: Option<String>,
    pub dapp_share: Option<String>,
    pub id_token: Option<String>,
    pub oauth_id_token: Option<String>,
}

// =============================================================================
// CLUSTER D: PERSISTENCE
// =============================================================================

/// Storage area a value is kept in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// Cleared when the session ends.
    #[default]
    Session,
    /// Survives across sessions.
    Local,
}

impl StorageKind {
    /// Wire name of the storage kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Session => "session",
            Self::Local => "local",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "session" => Ok(Self::Session),
            "local" => Ok(Self::Local),
            _ => Err(ParseEntityError {
                kind: "storage kind",
                value: s.to_string(),
            }),
        }
    }
}
