//! Ledger node access.
//!
//! # Data Flow
//! ```text
//! LedgerReader / LedgerWriter (traits, this module)
//!     → rpc.rs  (alloy provider with per-request timeouts)
//!     → mock.rs (in-memory node for tests and offline development)
//! ```
//!
//! Every call is a live, stateless round trip; there is no caching layer, so
//! repeated lookups stay idempotent and side-effect-free on the remote node.

use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::error::{ChainError, ChainResult};
use crate::types::{Block, Header, Receipt, TxRecord};

pub mod mock;
pub mod rpc;

pub use mock::MockNode;
pub use rpc::RpcNode;

/// Read-only queries against a ledger node.
///
/// Implementations must distinguish an entity unknown to the node
/// (`ChainError::NotFound`) from a failed round trip
/// (`ChainError::TransientIo`); the confirmation poller relies on it.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    /// Header at the given block number.
    async fn header_by_number(&self, number: u64) -> ChainResult<Header>;

    /// Full block (with ordered transactions) at the given number.
    async fn block_by_number(&self, number: u64) -> ChainResult<Block>;

    /// Full block (with ordered transactions) by its hash.
    async fn block_by_hash(&self, hash: B256) -> ChainResult<Block>;

    /// Transaction by hash, plus whether it is still pending (known to the
    /// node but not yet included in a block).
    async fn transaction_by_hash(&self, hash: B256) -> ChainResult<(TxRecord, bool)>;

    /// Indexed lookup of one transaction inside a block.
    ///
    /// Must agree with fetching the full block and indexing its transaction
    /// list locally; `validator` enforces this.
    async fn transaction_in_block(&self, block_hash: B256, index: u64) -> ChainResult<TxRecord>;

    /// Number of transactions in the block with the given hash.
    async fn transaction_count(&self, block_hash: B256) -> ChainResult<u64>;

    /// Receipt for a transaction, available only after inclusion.
    ///
    /// `NotFound` does not distinguish "not yet mined" from "unknown hash";
    /// the node reports both the same way.
    async fn receipt(&self, tx_hash: B256) -> ChainResult<Receipt>;

    /// Next nonce the node would accept for `address`, accounting for the
    /// sender's own unconfirmed transactions.
    async fn pending_nonce(&self, address: Address) -> ChainResult<u64>;

    /// Node-suggested gas price in wei.
    async fn suggest_gas_price(&self) -> ChainResult<u128>;

    /// Network identifier, mixed into signatures for replay protection.
    async fn network_id(&self) -> ChainResult<u64>;
}

/// Transaction submission to a ledger node.
#[async_trait]
pub trait LedgerWriter: Send + Sync {
    /// Submit a raw signed transaction; returns its content hash.
    async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<B256>;
}

/// A node supporting both reads and submission.
pub trait LedgerNode: LedgerReader + LedgerWriter {}

impl<T: LedgerReader + LedgerWriter> LedgerNode for T {}

/// Verify that `reader` serves the expected chain.
///
/// Fails with `ChainMismatch` before any transaction could be signed against
/// the wrong network.
pub async fn verify_chain_id<R: LedgerReader + ?Sized>(
    reader: &R,
    expected: u64,
) -> ChainResult<()> {
    let actual = reader.network_id().await?;
    if actual != expected {
        return Err(ChainError::ChainMismatch { expected, actual });
    }
    Ok(())
}
