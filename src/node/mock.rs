//! In-memory ledger node for tests and offline development.
//!
//! Behaves like a single well-behaved node: seeded blocks are immutable,
//! submitted transactions are nonce-checked against the sender's pending
//! sequence, and receipts become visible after a configurable number of
//! polls. Fault switches let tests exercise the failure paths the real node
//! only produces under duress.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;

use alloy::consensus::transaction::SignerRecoverable;
use alloy::consensus::{Transaction as _, TxEnvelope};
use alloy::eips::eip2718::Decodable2718;
use alloy::primitives::{Address, B256};
use async_trait::async_trait;

use crate::error::{ChainError, ChainResult};
use crate::node::{LedgerReader, LedgerWriter};
use crate::types::{Block, ExecutionStatus, Header, Receipt, TxLocation, TxRecord};

#[derive(Debug)]
struct MockState {
    chain_id: u64,
    gas_price: u128,
    blocks: BTreeMap<u64, Block>,
    block_numbers: HashMap<B256, u64>,
    /// Transaction records plus their pending flag.
    transactions: HashMap<B256, (TxRecord, bool)>,
    receipts: HashMap<B256, Receipt>,
    /// Remaining receipt polls that still answer `NotFound` per hash.
    receipt_countdown: HashMap<B256, u32>,
    pending_nonces: HashMap<Address, u64>,
    next_block_number: u64,
    /// Polls a freshly submitted transaction stays unconfirmed.
    receipt_delay: u32,
    /// Execution status assigned to the next submitted transaction.
    next_status: ExecutionStatus,
    /// Hashes whose receipts are never produced.
    withheld: HashSet<B256>,
    /// When set, every read fails with this transient I/O message.
    io_fault: Option<String>,
    /// When set, only `receipt` fails with this transient I/O message.
    receipt_fault: Option<String>,
    /// Return a wrong hash from indexed lookup (consistency-check tests).
    corrupt_indexed_lookup: bool,
    /// Override the reported per-block transaction count.
    count_override: Option<u64>,
}

/// Programmable in-memory node implementing both node traits.
#[derive(Debug)]
pub struct MockNode {
    state: Mutex<MockState>,
}

impl MockNode {
    pub fn new(chain_id: u64) -> Self {
        Self {
            state: Mutex::new(MockState {
                chain_id,
                gas_price: 1_000_000_000,
                blocks: BTreeMap::new(),
                block_numbers: HashMap::new(),
                transactions: HashMap::new(),
                receipts: HashMap::new(),
                receipt_countdown: HashMap::new(),
                pending_nonces: HashMap::new(),
                next_block_number: 1,
                receipt_delay: 0,
                next_status: ExecutionStatus::Success,
                withheld: HashSet::new(),
                io_fault: None,
                receipt_fault: None,
                corrupt_indexed_lookup: false,
                count_override: None,
            }),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Seed a confirmed block; its transactions become queryable by hash
    /// (with their inclusion location filled in) and receive success receipts.
    pub fn push_block(&self, mut block: Block) {
        let mut state = self.lock();
        state.block_numbers.insert(block.header.hash, block.header.number);
        state.next_block_number = state.next_block_number.max(block.header.number + 1);
        for (index, tx) in block.transactions.iter_mut().enumerate() {
            tx.location = Some(TxLocation {
                block_hash: block.header.hash,
                block_number: block.header.number,
                index: index as u64,
            });
        }
        for tx in &block.transactions {
            state.transactions.insert(tx.hash, (tx.clone(), false));
            state.receipts.insert(
                tx.hash,
                Receipt {
                    tx_hash: tx.hash,
                    block_number: block.header.number,
                    status: ExecutionStatus::Success,
                    logs: Vec::new(),
                },
            );
        }
        state.blocks.insert(block.header.number, block);
    }

    pub fn set_gas_price(&self, wei: u128) {
        self.lock().gas_price = wei;
    }

    pub fn set_pending_nonce(&self, address: Address, nonce: u64) {
        self.lock().pending_nonces.insert(address, nonce);
    }

    /// Number of receipt polls a submitted transaction answers `NotFound`
    /// before its receipt appears.
    pub fn set_receipt_delay(&self, polls: u32) {
        self.lock().receipt_delay = polls;
    }

    /// Execution status for subsequently submitted transactions.
    pub fn set_next_status(&self, status: ExecutionStatus) {
        self.lock().next_status = status;
    }

    /// Never produce a receipt for `tx_hash`, as if it were stuck forever.
    pub fn withhold_receipt(&self, tx_hash: B256) {
        self.lock().withheld.insert(tx_hash);
    }

    /// Undo `withhold_receipt`; the receipt becomes visible again.
    pub fn release_receipt(&self, tx_hash: B256) {
        self.lock().withheld.remove(&tx_hash);
    }

    /// Make every round trip fail with a transient I/O error.
    pub fn inject_io_fault(&self, message: &str) {
        self.lock().io_fault = Some(message.to_string());
    }

    /// Make only receipt lookups fail with a transient I/O error.
    pub fn inject_receipt_fault(&self, message: &str) {
        self.lock().receipt_fault = Some(message.to_string());
    }

    pub fn clear_faults(&self) {
        let mut state = self.lock();
        state.io_fault = None;
        state.receipt_fault = None;
    }

    /// Corrupt the indexed transaction lookup path.
    pub fn corrupt_indexed_lookup(&self) {
        self.lock().corrupt_indexed_lookup = true;
    }

    /// Report a fixed transaction count regardless of block contents.
    pub fn override_transaction_count(&self, count: u64) {
        self.lock().count_override = Some(count);
    }

    fn check_io(state: &MockState) -> ChainResult<()> {
        match &state.io_fault {
            Some(msg) => Err(ChainError::TransientIo(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl LedgerReader for MockNode {
    async fn header_by_number(&self, number: u64) -> ChainResult<Header> {
        let state = self.lock();
        Self::check_io(&state)?;
        state
            .blocks
            .get(&number)
            .map(|b| b.header.clone())
            .ok_or(ChainError::NotFound("block"))
    }

    async fn block_by_number(&self, number: u64) -> ChainResult<Block> {
        let state = self.lock();
        Self::check_io(&state)?;
        state
            .blocks
            .get(&number)
            .cloned()
            .ok_or(ChainError::NotFound("block"))
    }

    async fn block_by_hash(&self, hash: B256) -> ChainResult<Block> {
        let state = self.lock();
        Self::check_io(&state)?;
        state
            .block_numbers
            .get(&hash)
            .and_then(|n| state.blocks.get(n))
            .cloned()
            .ok_or(ChainError::NotFound("block"))
    }

    async fn transaction_by_hash(&self, hash: B256) -> ChainResult<(TxRecord, bool)> {
        let state = self.lock();
        Self::check_io(&state)?;
        state
            .transactions
            .get(&hash)
            .cloned()
            .ok_or(ChainError::NotFound("transaction"))
    }

    async fn transaction_in_block(&self, block_hash: B256, index: u64) -> ChainResult<TxRecord> {
        let state = self.lock();
        Self::check_io(&state)?;
        let block = state
            .block_numbers
            .get(&block_hash)
            .and_then(|n| state.blocks.get(n))
            .ok_or(ChainError::NotFound("block"))?;
        let mut tx = block
            .transactions
            .get(index as usize)
            .cloned()
            .ok_or(ChainError::NotFound("transaction"))?;
        if state.corrupt_indexed_lookup {
            tx.hash = B256::repeat_byte(0xde);
        }
        Ok(tx)
    }

    async fn transaction_count(&self, block_hash: B256) -> ChainResult<u64> {
        let state = self.lock();
        Self::check_io(&state)?;
        if let Some(count) = state.count_override {
            return Ok(count);
        }
        state
            .block_numbers
            .get(&block_hash)
            .and_then(|n| state.blocks.get(n))
            .map(|b| b.transactions.len() as u64)
            .ok_or(ChainError::NotFound("block"))
    }

    async fn receipt(&self, tx_hash: B256) -> ChainResult<Receipt> {
        let mut state = self.lock();
        Self::check_io(&state)?;
        if let Some(msg) = &state.receipt_fault {
            return Err(ChainError::TransientIo(msg.clone()));
        }
        if state.withheld.contains(&tx_hash) {
            return Err(ChainError::NotFound("receipt"));
        }
        if let Some(remaining) = state.receipt_countdown.get_mut(&tx_hash) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(ChainError::NotFound("receipt"));
            }
            state.receipt_countdown.remove(&tx_hash);
        }
        let receipt = state
            .receipts
            .get(&tx_hash)
            .cloned()
            .ok_or(ChainError::NotFound("receipt"))?;
        // A visible receipt means the transaction left the pool.
        if let Some((_, pending)) = state.transactions.get_mut(&tx_hash) {
            *pending = false;
        }
        Ok(receipt)
    }

    async fn pending_nonce(&self, address: Address) -> ChainResult<u64> {
        let state = self.lock();
        Self::check_io(&state)?;
        Ok(state.pending_nonces.get(&address).copied().unwrap_or(0))
    }

    async fn suggest_gas_price(&self) -> ChainResult<u128> {
        let state = self.lock();
        Self::check_io(&state)?;
        Ok(state.gas_price)
    }

    async fn network_id(&self) -> ChainResult<u64> {
        let state = self.lock();
        Self::check_io(&state)?;
        Ok(state.chain_id)
    }
}

#[async_trait]
impl LedgerWriter for MockNode {
    async fn send_raw_transaction(&self, raw: &[u8]) -> ChainResult<B256> {
        let envelope = TxEnvelope::decode_2718(&mut &raw[..]).map_err(|e| {
            ChainError::Rejected {
                tx_hash: None,
                reason: format!("malformed transaction: {}", e),
            }
        })?;
        let sender = envelope.recover_signer().map_err(|e| ChainError::Rejected {
            tx_hash: None,
            reason: format!("unrecoverable sender: {}", e),
        })?;

        let mut state = self.lock();
        Self::check_io(&state)?;
        if let Some(tx_chain) = envelope.chain_id() {
            if tx_chain != state.chain_id {
                return Err(ChainError::Rejected {
                    tx_hash: None,
                    reason: format!(
                        "transaction bound to chain {}, node is on {}",
                        tx_chain, state.chain_id
                    ),
                });
            }
        }
        let expected = state.pending_nonces.get(&sender).copied().unwrap_or(0);
        if envelope.nonce() != expected {
            return Err(ChainError::Rejected {
                tx_hash: None,
                reason: format!(
                    "invalid nonce: got {}, expected {}",
                    envelope.nonce(),
                    expected
                ),
            });
        }
        state.pending_nonces.insert(sender, expected + 1);

        let hash = *envelope.tx_hash();
        let record = TxRecord {
            hash,
            nonce: envelope.nonce(),
            to: envelope.to(),
            value: envelope.value(),
            gas_limit: envelope.gas_limit(),
            gas_price: envelope.gas_price().unwrap_or_default(),
            input: envelope.input().clone(),
            location: None,
        };
        state.transactions.insert(hash, (record, true));

        let block_number = state.next_block_number;
        state.next_block_number += 1;
        let status = state.next_status;
        let delay = state.receipt_delay;
        state.receipts.insert(
            hash,
            Receipt {
                tx_hash: hash,
                block_number,
                status,
                logs: Vec::new(),
            },
        );
        if delay > 0 {
            state.receipt_countdown.insert(hash, delay);
        }

        Ok(hash)
    }
}
