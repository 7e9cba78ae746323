//! # Chain Configuration
//!
//! Network parameters handed to adapters, plus the built-in defaults used
//! when a coordinator is only told which namespace (and maybe chain id) to
//! run on.

use crate::entities::ChainNamespace;
use serde::{Deserialize, Serialize};

/// Fully resolved chain configuration assigned to an adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub chain_namespace: ChainNamespace,
    /// Hex encoded chain id, e.g. `0x1`.
    pub chain_id: String,
    pub rpc_target: String,
    pub display_name: String,
    pub block_explorer: String,
    pub ticker: String,
    pub ticker_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decimals: Option<u8>,
}

/// Caller supplied overrides. Every field is optional; set fields win over
/// the namespace defaults when merged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialChainConfig {
    pub chain_id: Option<String>,
    pub rpc_target: Option<String>,
    pub display_name: Option<String>,
    pub block_explorer: Option<String>,
    pub ticker: Option<String>,
    pub ticker_name: Option<String>,
    pub decimals: Option<u8>,
}

impl PartialChainConfig {
    /// Override only the chain id.
    pub fn with_chain_id(chain_id: impl Into<String>) -> Self {
        Self {
            chain_id: Some(chain_id.into()),
            ..Self::default()
        }
    }
}

impl ChainConfig {
    /// Empty configuration for a namespace without built-in defaults.
    fn blank(chain_namespace: ChainNamespace) -> Self {
        Self {
            chain_namespace,
            chain_id: String::new(),
            rpc_target: String::new(),
            display_name: String::new(),
            block_explorer: String::new(),
            ticker: String::new(),
            ticker_name: String::new(),
            decimals: None,
        }
    }

    /// Build the configuration for `namespace` and an optional override.
    ///
    /// Starts from [`default_chain_config`] for the override's chain id (or
    /// the namespace mainnet) and applies every field set in `overrides`.
    pub fn resolve(namespace: ChainNamespace, overrides: Option<&PartialChainConfig>) -> Self {
        let chain_id = overrides.and_then(|o| o.chain_id.as_deref());
        let base = default_chain_config(namespace, chain_id)
            .unwrap_or_else(|| Self::blank(namespace));
        match overrides {
            Some(o) => base.merge(o),
            None => base,
        }
    }

    /// Apply the set fields of `overrides` on top of `self`.
    pub fn merge(mut self, overrides: &PartialChainConfig) -> Self {
        if let Some(v) = &overrides.chain_id {
            self.chain_id = v.clone();
        }
        if let Some(v) = &overrides.rpc_target {
            self.rpc_target = v.clone();
        }
        if let Some(v) = &overrides.display_name {
            self.display_name = v.clone();
        }
        if let Some(v) = &overrides.block_explorer {
            self.block_explorer = v.clone();
        }
        if let Some(v) = &overrides.ticker {
            self.ticker = v.clone();
        }
        if let Some(v) = &overrides.ticker_name {
            self.ticker_name = v.clone();
        }
        if overrides.decimals.is_some() {
            self.decimals = overrides.decimals;
        }
        self
    }
}

fn evm(
    chain_id: &str,
    rpc: &str,
    name: &str,
    explorer: &str,
    ticker: &str,
    ticker_name: &str,
) -> ChainConfig {
    ChainConfig {
        chain_namespace: ChainNamespace::Eip155,
        chain_id: chain_id.to_string(),
        rpc_target: rpc.to_string(),
        display_name: name.to_string(),
        block_explorer: explorer.to_string(),
        ticker: ticker.to_string(),
        ticker_name: ticker_name.to_string(),
        decimals: Some(18),
    }
}

fn solana(chain_id: &str, rpc: &str, name: &str, explorer: &str) -> ChainConfig {
    ChainConfig {
        chain_namespace: ChainNamespace::Solana,
        chain_id: chain_id.to_string(),
        rpc_target: rpc.to_string(),
        display_name: name.to_string(),
        block_explorer: explorer.to_string(),
        ticker: "SOL".to_string(),
        ticker_name: "Solana Token".to_string(),
        decimals: Some(9),
    }
}

/// Built-in configuration for a namespace and chain id.
///
/// Unknown or missing chain ids fall back to the namespace mainnet.
/// `ChainNamespace::Other` has no defaults and yields `None`.
pub fn default_chain_config(
    namespace: ChainNamespace,
    chain_id: Option<&str>,
) -> Option<ChainConfig> {
    let id = chain_id.map(|c| c.trim().to_ascii_lowercase());
    match namespace {
        ChainNamespace::Eip155 => Some(match id.as_deref() {
            Some("0x5") => evm(
                "0x5",
                "https://rpc.ankr.com/eth_goerli",
                "Goerli (Testnet)",
                "https://goerli.etherscan.io",
                "ETH",
                "Ethereum",
            ),
            Some("0x89") => evm(
                "0x89",
                "https://polygon-rpc.com",
                "Polygon Mainnet",
                "https://polygonscan.com",
                "MATIC",
                "Matic Network Token",
            ),
            Some("0x13881") => evm(
                "0x13881",
                "https://rpc-mumbai.maticvigil.com",
                "Polygon Mumbai Testnet",
                "https://mumbai.polygonscan.com",
                "MATIC",
                "Matic Network Token",
            ),
            Some("0x38") => evm(
                "0x38",
                "https://bsc-dataseed.binance.org",
                "Binance SmartChain Mainnet",
                "https://bscscan.com",
                "BNB",
                "Binance SmartChain",
            ),
            Some("0x61") => evm(
                "0x61",
                "https://data-seed-prebsc-1-s1.binance.org:8545",
                "Binance SmartChain Testnet",
                "https://testnet.bscscan.com",
                "BNB",
                "Binance SmartChain",
            ),
            _ => evm(
                "0x1",
                "https://rpc.ankr.com/eth",
                "Ethereum Mainnet",
                "https://etherscan.io",
                "ETH",
                "Ethereum",
            ),
        }),
        ChainNamespace::Solana => Some(match id.as_deref() {
            Some("0x2") => solana(
                "0x2",
                "https://api.testnet.solana.com",
                "Solana Testnet",
                "https://explorer.solana.com?cluster=testnet",
            ),
            Some("0x3") => solana(
                "0x3",
                "https://api.devnet.solana.com",
                "Solana Devnet",
                "https://explorer.solana.com?cluster=devnet",
            ),
            _ => solana(
                "0x1",
                "https://api.mainnet-beta.solana.com",
                "Solana Mainnet",
                "https://explorer.solana.com",
            ),
        }),
        ChainNamespace::Other => None,
    }
}
