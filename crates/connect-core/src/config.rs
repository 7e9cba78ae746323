//! Coordinator configuration.

use serde::{Deserialize, Serialize};
use shared_types::{ChainConfig, ChainNamespace, PartialChainConfig, StorageKind};
use std::env;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held an unparseable value.
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    /// A required variable was not set.
    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    /// Namespaces without built-in defaults need explicit chain parameters.
    #[error("Namespace {namespace} has no default chain config, {field} must be provided")]
    IncompleteChainConfig {
        namespace: ChainNamespace,
        field: &'static str,
    },
}

/// Immutable coordinator options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreOptions {
    /// Namespace every registered adapter must be able to serve
    pub chain_namespace: ChainNamespace,

    /// Overrides merged over the namespace defaults at init
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_config: Option<PartialChainConfig>,

    /// Storage area holding the remembered adapter
    #[serde(default)]
    pub storage_kind: StorageKind,
}

impl CoreOptions {
    pub fn new(chain_namespace: ChainNamespace) -> Self {
        Self {
            chain_namespace,
            chain_config: None,
            storage_kind: StorageKind::default(),
        }
    }

    pub fn with_chain_config(mut self, chain_config: PartialChainConfig) -> Self {
        self.chain_config = Some(chain_config);
        self
    }

    pub fn with_storage_kind(mut self, storage_kind: StorageKind) -> Self {
        self.storage_kind = storage_kind;
        self
    }

    /// Create options from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `CH_CHAIN_NAMESPACE`: `eip155`, `solana` or `other` (required)
    /// - `CH_CHAIN_ID`: Hex chain id override
    /// - `CH_RPC_TARGET`: RPC endpoint override
    /// - `CH_STORAGE_KIND`: `session` (default) or `local`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`CoreOptions::from_env`] with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let namespace =
            lookup("CH_CHAIN_NAMESPACE").ok_or(ConfigError::Missing("CH_CHAIN_NAMESPACE"))?;
        let chain_namespace = namespace
            .parse::<ChainNamespace>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "CH_CHAIN_NAMESPACE",
                value: namespace.clone(),
            })?;

        let storage_kind = match lookup("CH_STORAGE_KIND") {
            Some(value) => value
                .parse::<StorageKind>()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "CH_STORAGE_KIND",
                    value,
                })?,
            None => StorageKind::default(),
        };

        let chain_id = lookup("CH_CHAIN_ID").filter(|v| !v.is_empty());
        let rpc_target = lookup("CH_RPC_TARGET").filter(|v| !v.is_empty());
        let chain_config = if chain_id.is_some() || rpc_target.is_some() {
            Some(PartialChainConfig {
                chain_id,
                rpc_target,
                ..PartialChainConfig::default()
            })
        } else {
            None
        };

        let options = Self {
            chain_namespace,
            chain_config,
            storage_kind,
        };
        options.validate()?;
        Ok(options)
    }

    /// Check that a chain config can be resolved for the namespace.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chain_namespace != ChainNamespace::Other {
            return Ok(());
        }
        let overrides = self.chain_config.as_ref();
        if overrides.and_then(|c| c.chain_id.as_ref()).is_none() {
            return Err(ConfigError::IncompleteChainConfig {
                namespace: self.chain_namespace,
                field: "chainId",
            });
        }
        if overrides.and_then(|c| c.rpc_target.as_ref()).is_none() {
            return Err(ConfigError::IncompleteChainConfig {
                namespace: self.chain_namespace,
                field: "rpcTarget",
            });
        }
        Ok(())
    }

    /// Chain config assigned to adapters that have none of their own.
    pub fn resolved_chain_config(&self) -> ChainConfig {
        ChainConfig::resolve(self.chain_namespace, self.chain_config.as_ref())
    }
}
