//! Shared fixtures for integration tests.
#![allow(dead_code)] // not every test binary uses every fixture

use alloy::primitives::{b256, Address, B256, U256};
use ledgerflow::node::MockNode;
use ledgerflow::types::{Block, Header, TxRecord};
use ledgerflow::NodeConfig;

/// Well-known test private key (Anvil's first account).
pub const TEST_PRIVATE_KEY: &str =
    "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

/// Sepolia block used by the read-path scenario.
pub const SCENARIO_BLOCK_NUMBER: u64 = 5_671_744;
pub const SCENARIO_BLOCK_TIMESTAMP: u64 = 1_712_798_400;
pub const SCENARIO_TX_COUNT: usize = 70;
pub const SCENARIO_BLOCK_HASH: B256 =
    b256!("ae713dea1419ac72b928ebe6ba9915cd4fc1ef125a606f90f5e783c47cb1a4b5");
pub const SCENARIO_FIRST_TX_HASH: B256 =
    b256!("20294a03e8766e9aeab58327fc4112756017c6c28f6f99c7722f4a29075601c5");

/// A config tuned for tests: millisecond polling, short deadline.
pub fn fast_config() -> NodeConfig {
    NodeConfig {
        poll_interval_ms: 5,
        confirmation_timeout_secs: 5,
        ..Default::default()
    }
}

/// Seed a node with the scenario block: 70 transactions, the first one with
/// its real hash and fields.
pub fn seed_scenario_block(node: &MockNode) {
    let transactions = (0..SCENARIO_TX_COUNT)
        .map(|i| {
            let hash = if i == 0 {
                SCENARIO_FIRST_TX_HASH
            } else {
                B256::with_last_byte(i as u8)
            };
            TxRecord {
                hash,
                nonce: 245_132 + i as u64,
                to: Some(Address::repeat_byte(0x8f)),
                value: U256::from(100_000_000_000_000_000u128),
                gas_limit: 21_000,
                gas_price: 100_000_000_000,
                input: Default::default(),
                location: None,
            }
        })
        .collect();

    node.push_block(Block {
        header: Header {
            number: SCENARIO_BLOCK_NUMBER,
            timestamp: SCENARIO_BLOCK_TIMESTAMP,
            difficulty: U256::ZERO,
            hash: SCENARIO_BLOCK_HASH,
        },
        transactions,
    });
}
