//! Configuration schema.
//!
//! All fields have serde defaults so a partial TOML file yields a usable
//! configuration.

use serde::{Deserialize, Serialize};

/// Environment variable overriding the RPC endpoint URL.
pub const RPC_URL_ENV_VAR: &str = "LEDGERFLOW_RPC_URL";

/// Client configuration for one ledger node.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NodeConfig {
    /// JSON-RPC endpoint URL.
    pub rpc_url: String,

    /// Expected chain ID (e.g., 11155111 for Sepolia, 31337 for local Anvil).
    /// When set, connecting verifies the node agrees.
    pub expected_chain_id: Option<u64>,

    /// Per-request RPC timeout in seconds.
    pub rpc_timeout_secs: u64,

    /// Delay between receipt polls while a transaction is unconfirmed.
    pub poll_interval_ms: u64,

    /// Overall deadline for a confirmation wait. 0 disables the deadline;
    /// the wait is then bounded only by the caller's cancellation signal.
    pub confirmation_timeout_secs: u64,

    /// Gas price multiplier (1.0 = suggested, 1.2 = 20% buffer).
    pub gas_price_multiplier: f64,

    /// Maximum gas price in gwei (protection against spikes).
    pub max_gas_price_gwei: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            rpc_url: "http://localhost:8545".to_string(),
            expected_chain_id: None,
            rpc_timeout_secs: 10,
            poll_interval_ms: 2_000,
            confirmation_timeout_secs: 300,
            gas_price_multiplier: 1.0,
            max_gas_price_gwei: 500,
        }
    }
}
