//! Domain types for chain reads.
//!
//! These are deliberately decoupled from alloy's RPC response types so the
//! node interface stays mockable; `node::rpc` owns the mapping from the wire
//! representation.

use alloy::primitives::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// Scalar fields of a block, retrievable without the transaction list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub number: u64,
    pub timestamp: u64,
    pub difficulty: U256,
    pub hash: B256,
}

/// A block with its consensus-ordered transaction list.
///
/// Transaction order must be preserved as returned by the node; indexed
/// lookups are defined against this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub transactions: Vec<TxRecord>,
}

/// Where a transaction landed on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxLocation {
    pub block_hash: B256,
    pub block_number: u64,
    pub index: u64,
}

/// A transaction as reported by the node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxRecord {
    pub hash: B256,
    pub nonce: u64,
    /// `None` for contract-creation transactions.
    pub to: Option<Address>,
    pub value: U256,
    pub gas_limit: u64,
    pub gas_price: u128,
    pub input: Bytes,
    /// `None` while the transaction is pending.
    pub location: Option<TxLocation>,
}

/// Execution outcome recorded in a receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// The transaction was included and its execution succeeded.
    Success,
    /// The transaction was included but its execution reverted. This is a
    /// business-level failure, not a client error.
    Failure,
}

/// An emitted event record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}

/// Post-inclusion record of a transaction's execution outcome.
///
/// Produced by the node only after the transaction's block is known;
/// immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub status: ExecutionStatus,
    pub logs: Vec<LogRecord>,
}

/// Caller intent for a new transaction; chain-derived fields (nonce, gas
/// price, network id) are filled in by the builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferIntent {
    /// Destination, or `None` for contract creation.
    pub to: Option<Address>,
    /// Native token amount in wei.
    pub value: U256,
    /// Call data; empty for plain transfers.
    pub payload: Bytes,
    /// Gas budget. Must be non-zero.
    pub gas_limit: u64,
}

impl TransferIntent {
    /// A plain value transfer with the intrinsic gas budget.
    pub fn transfer(to: Address, value: U256) -> Self {
        Self {
            to: Some(to),
            value,
            payload: Bytes::new(),
            gas_limit: 21_000,
        }
    }

    /// A contract-creation transaction carrying `code` as init payload.
    pub fn create(code: Bytes, value: U256, gas_limit: u64) -> Self {
        Self {
            to: None,
            value,
            payload: code,
            gas_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_intent_defaults() {
        let to = Address::repeat_byte(0x11);
        let intent = TransferIntent::transfer(to, U256::from(1000));
        assert_eq!(intent.to, Some(to));
        assert_eq!(intent.gas_limit, 21_000);
        assert!(intent.payload.is_empty());
    }

    #[test]
    fn test_create_intent_has_no_destination() {
        let intent = TransferIntent::create(Bytes::from(vec![0x60, 0x80]), U256::ZERO, 300_000);
        assert_eq!(intent.to, None);
        assert_eq!(intent.payload.len(), 2);
    }

    #[test]
    fn test_receipt_json_round_trip() {
        let receipt = Receipt {
            tx_hash: B256::repeat_byte(0x42),
            block_number: 5_671_744,
            status: ExecutionStatus::Success,
            logs: vec![LogRecord {
                address: Address::repeat_byte(0x01),
                topics: vec![B256::ZERO],
                data: Bytes::from(vec![0xff]),
            }],
        };
        let json = serde_json::to_string(&receipt).unwrap();
        let back: Receipt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, receipt);
    }
}
