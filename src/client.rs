//! Client facade wiring the lifecycle together.
//!
//! # Data Flow
//! ```text
//! NodeConfig
//!     → RpcNode::connect (or any LedgerNode, e.g. MockNode in tests)
//!     → read API        (headers, blocks, receipts, cross-validated reads)
//!     → write API       (build_and_send → await_confirmation)
//! ```
//!
//! The client owns no ambient state beyond the per-address submission locks;
//! everything else is a stateless round trip against the node.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, B256};
use tokio::time::timeout;

use crate::config::NodeConfig;
use crate::error::{ChainError, ChainResult};
use crate::lifecycle::Cancel;
use crate::node::{LedgerNode, LedgerReader, RpcNode};
use crate::nonce::NonceLocks;
use crate::tx::{sign_transaction, Broadcaster, Confirmation, ConfirmationPoller, TransactionBuilder};
use crate::types::{Block, Header, Receipt, TransferIntent, TxRecord};
use crate::validator::ChainDataValidator;
use crate::wallet::Wallet;

/// Transaction lifecycle client against one ledger node.
pub struct LifecycleClient<N: LedgerNode> {
    node: Arc<N>,
    config: NodeConfig,
    nonce_locks: NonceLocks,
}

impl LifecycleClient<RpcNode> {
    /// Connect to the configured JSON-RPC endpoint.
    pub async fn connect(config: NodeConfig) -> ChainResult<Self> {
        let node = RpcNode::connect(&config).await?;
        Ok(Self::with_node(node, config))
    }
}

impl<N: LedgerNode> LifecycleClient<N> {
    /// Wrap an already constructed node implementation.
    pub fn with_node(node: N, config: NodeConfig) -> Self {
        Self {
            node: Arc::new(node),
            config,
            nonce_locks: NonceLocks::new(),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    // --- read API ---

    pub async fn header_by_number(&self, number: u64) -> ChainResult<Header> {
        self.node.header_by_number(number).await
    }

    pub async fn block_by_number(&self, number: u64) -> ChainResult<Block> {
        self.node.block_by_number(number).await
    }

    pub async fn block_by_hash(&self, hash: B256) -> ChainResult<Block> {
        self.node.block_by_hash(hash).await
    }

    pub async fn transaction_by_hash(&self, hash: B256) -> ChainResult<(TxRecord, bool)> {
        self.node.transaction_by_hash(hash).await
    }

    pub async fn transaction_count(&self, block_hash: B256) -> ChainResult<u64> {
        self.node.transaction_count(block_hash).await
    }

    pub async fn receipt(&self, tx_hash: B256) -> ChainResult<Receipt> {
        self.node.receipt(tx_hash).await
    }

    pub async fn pending_nonce(&self, address: Address) -> ChainResult<u64> {
        self.node.pending_nonce(address).await
    }

    pub async fn network_id(&self) -> ChainResult<u64> {
        self.node.network_id().await
    }

    /// Transaction at `(block number, index)`, cross-validated over all
    /// three query paths.
    pub async fn checked_transaction(&self, number: u64, index: u64) -> ChainResult<TxRecord> {
        ChainDataValidator::new(&*self.node)
            .checked_transaction(number, index)
            .await
    }

    /// Transaction by hash, cross-validated over all three query paths.
    pub async fn checked_transaction_by_hash(&self, tx_hash: B256) -> ChainResult<TxRecord> {
        ChainDataValidator::new(&*self.node)
            .checked_transaction_by_hash(tx_hash)
            .await
    }

    // --- write API ---

    /// Build, sign, and broadcast a transaction; returns its hash.
    ///
    /// Submissions from the same address are serialized by a per-address
    /// lock held from nonce fetch through broadcast, so concurrent callers
    /// cannot race on the same nonce. Different addresses proceed in
    /// parallel.
    pub async fn build_and_send(
        &self,
        intent: &TransferIntent,
        wallet: &Wallet,
    ) -> ChainResult<B256> {
        let sender = wallet.address();
        let _guard = self.nonce_locks.acquire(sender).await;

        let unsigned = TransactionBuilder::new(&*self.node, &self.config)
            .build(intent, sender)
            .await?;
        let signed = sign_transaction(unsigned, wallet)?;
        let local_hash = *signed.hash();

        Broadcaster::new(&*self.node)
            .submit(&signed)
            .await
            .inspect_err(|e| {
                tracing::warn!(tx_hash = %local_hash, error = %e, "Submission failed");
            })
    }

    /// Wait for the receipt of a broadcast transaction.
    ///
    /// Bounded by both the caller's cancellation signal and the configured
    /// confirmation deadline (`confirmation_timeout_secs`; 0 disables the
    /// deadline and leaves cancellation as the only way out).
    pub async fn await_confirmation(
        &self,
        tx_hash: B256,
        cancel: &Cancel,
    ) -> ChainResult<Confirmation> {
        let poller = ConfirmationPoller::new(
            &*self.node,
            Duration::from_millis(self.config.poll_interval_ms),
        );

        if self.config.confirmation_timeout_secs == 0 {
            return poller.wait(tx_hash, cancel).await;
        }

        let deadline = Duration::from_secs(self.config.confirmation_timeout_secs);
        match timeout(deadline, poller.wait(tx_hash, cancel)).await {
            Ok(result) => result,
            Err(_) => Err(ChainError::ConfirmationTimeout {
                tx_hash,
                waited_secs: deadline.as_secs(),
            }),
        }
    }

    /// Convenience: `build_and_send` then `await_confirmation`.
    pub async fn transfer(
        &self,
        intent: &TransferIntent,
        wallet: &Wallet,
        cancel: &Cancel,
    ) -> ChainResult<Confirmation> {
        let tx_hash = self.build_and_send(intent, wallet).await?;
        self.await_confirmation(tx_hash, cancel).await
    }
}

impl<N: LedgerNode> std::fmt::Debug for LifecycleClient<N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleClient")
            .field("rpc_url", &self.config.rpc_url)
            .field("poll_interval_ms", &self.config.poll_interval_ms)
            .finish()
    }
}
