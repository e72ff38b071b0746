//! JSON-RPC implementation of the node traits.
//!
//! # Responsibilities
//! - Connect to a JSON-RPC endpoint
//! - Map wire responses into domain types
//! - Enforce a per-request timeout
//! - Classify failures: absent entity vs failed round trip

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use alloy::consensus::Transaction as _;
use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::primitives::{Address, B256};
use alloy::providers::{Provider, ProviderBuilder};
use alloy::rpc::types::{Block as RpcBlock, BlockTransactions, Transaction as RpcTransaction};
use alloy::transports::{RpcError, TransportErrorKind};
use async_trait::async_trait;
use tokio::time::timeout;

use crate::config::NodeConfig;
use crate::error::{ChainError, ChainResult};
use crate::node::{LedgerReader, LedgerWriter};
use crate::types::{Block, ExecutionStatus, Header, LogRecord, Receipt, TxLocation, TxRecord};

/// Ledger node reached over JSON-RPC.
///
/// Explicitly constructed and passed by reference; there is no ambient or
/// global client, so multiple instances (one per test, say) never interfere.
#[derive(Clone)]
pub struct RpcNode {
    provider: Arc<dyn Provider + Send + Sync>,
    timeout_duration: Duration,
    rpc_url: String,
}

impl RpcNode {
    /// Connect to the configured endpoint.
    ///
    /// When `expected_chain_id` is set, the node's chain id is checked and a
    /// mismatch fails with `ChainMismatch` before any transaction could be
    /// signed against the wrong network.
    pub async fn connect(config: &NodeConfig) -> ChainResult<Self> {
        let url: url::Url = config.rpc_url.parse().map_err(|e| {
            ChainError::TransientIo(format!("Invalid RPC URL '{}': {}", config.rpc_url, e))
        })?;

        let node = Self {
            provider: Arc::new(ProviderBuilder::new().connect_http(url)),
            timeout_duration: Duration::from_secs(config.rpc_timeout_secs),
            rpc_url: config.rpc_url.clone(),
        };

        if let Some(expected) = config.expected_chain_id {
            crate::node::verify_chain_id(&node, expected).await?;
        }

        tracing::info!(
            rpc_url = %config.rpc_url,
            timeout_secs = config.rpc_timeout_secs,
            "Ledger node client initialized"
        );

        Ok(node)
    }

    /// Run one RPC round trip under the configured timeout.
    async fn round_trip<T, F>(&self, fut: F) -> ChainResult<T>
    where
        F: IntoFuture<Output = Result<T, RpcError<TransportErrorKind>>>,
    {
        match timeout(self.timeout_duration, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                tracing::warn!(rpc_url = %self.rpc_url, error = %e, "RPC error");
                Err(ChainError::TransientIo(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(rpc_url = %self.rpc_url, "RPC timeout");
                Err(ChainError::TransientIo(format!(
                    "RPC timeout after {}s",
                    self.timeout_duration.as_secs()
                )))
            }
        }
    }
}

#[async_trait]
impl LedgerReader for RpcNode {
    async fn header_by_number(&self, number: u64) -> ChainResult<Header> {
        let block = self
            .round_trip(
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Number(number)),
            )
            .await?
            .ok_or(ChainError::NotFound("block"))?;
        Ok(map_header(&block))
    }

    async fn block_by_number(&self, number: u64) -> ChainResult<Block> {
        let block = self
            .round_trip(
                self.provider
                    .get_block_by_number(BlockNumberOrTag::Number(number))
                    .full(),
            )
            .await?
            .ok_or(ChainError::NotFound("block"))?;
        map_block(block)
    }

    async fn block_by_hash(&self, hash: B256) -> ChainResult<Block> {
        let block = self
            .round_trip(self.provider.get_block_by_hash(hash).full())
            .await?
            .ok_or(ChainError::NotFound("block"))?;
        map_block(block)
    }

    async fn transaction_by_hash(&self, hash: B256) -> ChainResult<(TxRecord, bool)> {
        let tx = self
            .round_trip(self.provider.get_transaction_by_hash(hash))
            .await?
            .ok_or(ChainError::NotFound("transaction"))?;
        let pending = tx.block_number.is_none();
        Ok((map_transaction(&tx), pending))
    }

    async fn transaction_in_block(&self, block_hash: B256, index: u64) -> ChainResult<TxRecord> {
        let tx = self
            .round_trip(
                self.provider
                    .get_transaction_by_block_hash_and_index(block_hash, index as usize),
            )
            .await?
            .ok_or(ChainError::NotFound("transaction"))?;
        Ok(map_transaction(&tx))
    }

    async fn transaction_count(&self, block_hash: B256) -> ChainResult<u64> {
        self.round_trip(self.provider.get_block_transaction_count_by_hash(block_hash))
            .await?
            .ok_or(ChainError::NotFound("block"))
    }

    async fn receipt(&self, tx_hash: B256) -> ChainResult<Receipt> {
        let receipt = self
            .round_trip(self.provider.get_transaction_receipt(tx_hash))
            .await?
            .ok_or(ChainError::NotFound("receipt"))?;

        let status = if receipt.status() {
            ExecutionStatus::Success
        } else {
            ExecutionStatus::Failure
        };
        let logs = receipt
            .inner
            .logs()
            .iter()
            .map(|log| LogRecord {
                address: log.inner.address,
                topics: log.inner.data.topics().to_vec(),
                data: log.inner.data.data.clone(),
            })
            .collect();

        Ok(Receipt {
            tx_hash: receipt.transaction_hash,
            // A returned receipt always carries its block; guard anyway.
            block_number: receipt.block_number.ok_or(ChainError::NotFound("receipt"))?,
            status,
            logs,
        })
    }

    async fn pending_nonce(&self, address: Address) -> ChainResult<u64> {
        self.round_trip(
            self.provider
                .get_transaction_count(address)
                .block_id(BlockId::pending()),
        )
        .await
    }

    async fn suggest_gas_price(&self) -> ChainResult<u128> {
        self.round_trip(self.provider.get_gas_price()).await
    }

    async fn network_id(&self) -> ChainResult<u64> {
        self.round_trip(self.provider.get_chain_id()).await
    }
}

#[async_trait]
impl LedgerWriter for RpcNode {
    async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<B256> {
        match timeout(self.timeout_duration, self.provider.send_raw_transaction(raw)).await {
            Ok(Ok(pending)) => Ok(*pending.tx_hash()),
            // A node-level error response means the transaction was refused;
            // that is terminal, unlike a failed round trip.
            Ok(Err(e)) => match e.as_error_resp() {
                Some(payload) => Err(ChainError::Rejected {
                    tx_hash: None,
                    reason: payload.message.to_string(),
                }),
                None => Err(ChainError::TransientIo(e.to_string())),
            },
            Err(_) => Err(ChainError::TransientIo(format!(
                "RPC timeout after {}s",
                self.timeout_duration.as_secs()
            ))),
        }
    }
}

impl std::fmt::Debug for RpcNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcNode")
            .field("rpc_url", &self.rpc_url)
            .field("timeout", &self.timeout_duration)
            .finish()
    }
}

fn map_header(block: &RpcBlock) -> Header {
    Header {
        number: block.header.number,
        timestamp: block.header.timestamp,
        difficulty: block.header.difficulty,
        hash: block.header.hash,
    }
}

fn map_block(block: RpcBlock) -> ChainResult<Block> {
    let header = map_header(&block);
    let transactions = match &block.transactions {
        BlockTransactions::Full(txs) => txs.iter().map(map_transaction).collect(),
        // The block was requested with full transaction bodies; anything else
        // means the node answered a different question than asked.
        _ => {
            return Err(ChainError::ConsistencyViolation(
                "node returned transaction hashes where full bodies were requested".into(),
            ))
        }
    };
    Ok(Block {
        header,
        transactions,
    })
}

fn map_transaction(tx: &RpcTransaction) -> TxRecord {
    let location = match (tx.block_hash, tx.block_number, tx.transaction_index) {
        (Some(block_hash), Some(block_number), Some(index)) => Some(TxLocation {
            block_hash,
            block_number,
            index,
        }),
        _ => None,
    };
    TxRecord {
        hash: *tx.inner.tx_hash(),
        nonce: tx.nonce(),
        to: tx.to(),
        value: tx.value(),
        gas_limit: tx.gas_limit(),
        gas_price: tx.gas_price().unwrap_or_else(|| tx.max_fee_per_gas()),
        input: tx.input().clone(),
        location,
    }
}
