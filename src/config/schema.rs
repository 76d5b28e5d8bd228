//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::blockchain::types::NetworkRole;
use crate::quoting::{DecimalAmount, TestnetFeePreset};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Operator settings for bridge and mint.
    pub settings: SettingsConfig,

    /// Mainnet and testnet endpoints and contracts.
    pub networks: NetworksConfig,

    /// RPC request settings.
    pub rpc: RpcConfig,

    /// Poll intervals and waits.
    pub polling: PollingConfig,

    /// Account ledger location and ordering.
    pub accounts: AccountsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Flat operator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SettingsConfig {
    /// Mint price in ether.
    pub mint_price: DecimalAmount,

    /// Destination gas price assumed when quoting the mint fee, in gwei.
    pub gas_price_for_mint: DecimalAmount,

    /// Gas units budgeted for the mint call.
    pub gas_for_mint: u64,

    /// Highest acceptable source gas price before bridging, in gwei.
    pub max_gas_in_gwei: DecimalAmount,

    /// Target bridge amount in ether (used with `accuracy_in_amount_for_bridge`).
    pub bridge_amount: Option<DecimalAmount>,

    /// Maximum deviation from `bridge_amount`, in ether.
    pub accuracy_in_amount_for_bridge: Option<DecimalAmount>,

    /// Lower bridge bound in ether (used with `max_amount_for_bridge`).
    pub min_amount_for_bridge: Option<DecimalAmount>,

    /// Upper bridge bound in ether.
    pub max_amount_for_bridge: Option<DecimalAmount>,

    pub is_testnet_bridge: bool,

    pub is_testnet_mint: bool,

    /// ERC-1155 collection address.
    pub nft_contract: Option<String>,

    /// Collection locator, `…/collect/<network>:<contract>/<token id>`.
    pub nft_url: Option<String>,

    /// Token id within the collection.
    pub nft_id: Option<String>,

    /// Testnet data-fee preset used when quoting bridges.
    pub testnet_fee_preset_bridge: TestnetFeePreset,

    /// Testnet data-fee preset used when quoting mints.
    pub testnet_fee_preset_mint: TestnetFeePreset,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            mint_price: DecimalAmount::new(777, 6),
            gas_price_for_mint: DecimalAmount::new(5, 3),
            gas_for_mint: 130_000,
            max_gas_in_gwei: DecimalAmount::new(18, 0),
            bridge_amount: Some(DecimalAmount::new(1, 3)),
            accuracy_in_amount_for_bridge: Some(DecimalAmount::new(5, 5)),
            min_amount_for_bridge: None,
            max_amount_for_bridge: None,
            is_testnet_bridge: false,
            is_testnet_mint: false,
            nft_contract: Some("0xF41A3e3033D4e878943194B729AeC993a4Ea2045".to_string()),
            nft_url: None,
            nft_id: Some("5".to_string()),
            testnet_fee_preset_bridge: TestnetFeePreset::ScalarA,
            testnet_fee_preset_mint: TestnetFeePreset::ScalarB,
        }
    }
}

/// Endpoints and contracts for mainnet and testnet.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworksConfig {
    #[serde(default = "NetworkSet::mainnet")]
    pub mainnet: NetworkSet,

    #[serde(default = "NetworkSet::testnet")]
    pub testnet: NetworkSet,
}

impl Default for NetworksConfig {
    fn default() -> Self {
        Self {
            mainnet: NetworkSet::mainnet(),
            testnet: NetworkSet::testnet(),
        }
    }
}

impl NetworksConfig {
    pub fn set(&self, testnet: bool) -> &NetworkSet {
        if testnet {
            &self.testnet
        } else {
            &self.mainnet
        }
    }

    pub fn endpoint(&self, role: NetworkRole, testnet: bool) -> &EndpointConfig {
        let set = self.set(testnet);
        match role {
            NetworkRole::Source => &set.source,
            NetworkRole::Destination => &set.destination,
        }
    }
}

/// One environment (mainnet or testnet).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkSet {
    /// L1 network bridged from.
    pub source: EndpointConfig,

    /// L2 network bridged to and minted on.
    pub destination: EndpointConfig,

    /// Bridge portal on the source network.
    pub bridge_contract: String,

    /// Fixed-price sale strategy on the destination network.
    pub minter_contract: String,
}

impl NetworkSet {
    pub fn mainnet() -> Self {
        Self {
            source: EndpointConfig::new("https://eth.llamarpc.com", 1),
            destination: EndpointConfig::new("https://rpc.zora.energy", 7_777_777),
            bridge_contract: "0x1a0ad011913A150f69f6A19DF447A0CfD9551054".to_string(),
            minter_contract: "0x169d9147dfc9409afa4e558df2c9abeebc020182".to_string(),
        }
    }

    pub fn testnet() -> Self {
        Self {
            source: EndpointConfig::new("https://rpc.ankr.com/eth_goerli", 5),
            destination: EndpointConfig::new("https://testnet.rpc.zora.energy", 999),
            bridge_contract: "0xDb9F51790365e7dc196e7D072728df39Be958ACe".to_string(),
            minter_contract: "0xd81351363b7d80b06e4ec4de7989f0f91e41a846".to_string(),
        }
    }
}

/// A JSON-RPC endpoint with optional failovers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Failover JSON-RPC endpoint URLs.
    #[serde(default)]
    pub failover_urls: Vec<String>,

    /// Expected chain ID.
    pub chain_id: u64,
}

impl EndpointConfig {
    fn new(rpc_url: &str, chain_id: u64) -> Self {
        Self {
            rpc_url: rpc_url.to_string(),
            failover_urls: Vec::new(),
            chain_id,
        }
    }
}

/// RPC request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RpcConfig {
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// Poll intervals and bounded waits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Delay between source gas price checks while above the ceiling.
    pub gas_poll_secs: u64,

    /// Delay between destination balance checks while waiting for bridged funds.
    pub balance_poll_secs: u64,

    /// Maximum wait for a transaction receipt.
    pub receipt_timeout_secs: u64,

    /// Delay between receipt queries.
    pub receipt_poll_secs: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            gas_poll_secs: 5,
            balance_poll_secs: 30,
            receipt_timeout_secs: 600,
            receipt_poll_secs: 2,
        }
    }
}

/// Account ledger settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AccountsConfig {
    /// Path to the JSON account ledger.
    pub path: String,

    /// Process accounts in random order.
    pub shuffle: bool,

    /// Fixed seed for shuffling and amount humanization.
    pub seed: Option<u64>,
}

impl Default for AccountsConfig {
    fn default() -> Self {
        Self {
            path: "accounts.json".to_string(),
            shuffle: true,
            seed: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of human-readable ones.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
