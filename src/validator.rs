//! Multi-path read consistency.
//!
//! A well-behaved node answers the same question the same way regardless of
//! the query path. The validator fetches one transaction through three
//! independent paths (full block by number with local indexing, indexed
//! lookup by block hash, direct lookup by hash) and demands bit-identical
//! hashes. A disagreement is reported, never resolved by preferring one
//! source: it indicates a node bug or a race with a concurrent
//! reorganization.

use alloy::primitives::B256;

use crate::error::{ChainError, ChainResult};
use crate::node::LedgerReader;
use crate::types::TxRecord;

/// Cross-validates chain reads against a single node.
pub struct ChainDataValidator<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
}

impl<'a, R: LedgerReader + ?Sized> ChainDataValidator<'a, R> {
    pub fn new(reader: &'a R) -> Self {
        Self { reader }
    }

    /// Fetch the transaction at `index` of the block at `number`, verified
    /// across all three query paths. Also checks the node's transaction
    /// count for the block against the full block's list length.
    pub async fn checked_transaction(&self, number: u64, index: u64) -> ChainResult<TxRecord> {
        let block = self.reader.block_by_number(number).await?;
        let local = block
            .transactions
            .get(index as usize)
            .ok_or(ChainError::NotFound("transaction"))?;

        let count = self.reader.transaction_count(block.header.hash).await?;
        if count != block.transactions.len() as u64 {
            return Err(ChainError::ConsistencyViolation(format!(
                "block {}: node reports {} transactions, full block carries {}",
                number,
                count,
                block.transactions.len()
            )));
        }

        let indexed = self
            .reader
            .transaction_in_block(block.header.hash, index)
            .await?;
        let (direct, _pending) = self.reader.transaction_by_hash(local.hash).await?;

        assert_agreement(&[
            ("block_by_number", local.hash),
            ("transaction_in_block", indexed.hash),
            ("transaction_by_hash", direct.hash),
        ])?;

        Ok(direct)
    }

    /// Cross-validate a transaction starting from its hash. The transaction
    /// must be included; its reported location drives the other two paths.
    pub async fn checked_transaction_by_hash(&self, tx_hash: B256) -> ChainResult<TxRecord> {
        let (direct, pending) = self.reader.transaction_by_hash(tx_hash).await?;
        if pending {
            return Err(ChainError::InvalidRequest(
                "cannot cross-validate a pending transaction".into(),
            ));
        }
        let location = direct.location.ok_or_else(|| {
            ChainError::ConsistencyViolation(format!(
                "transaction {} reported as included but carries no location",
                tx_hash
            ))
        })?;

        let block = self.reader.block_by_number(location.block_number).await?;
        let local = block
            .transactions
            .get(location.index as usize)
            .ok_or(ChainError::NotFound("transaction"))?;
        let indexed = self
            .reader
            .transaction_in_block(location.block_hash, location.index)
            .await?;

        assert_agreement(&[
            ("transaction_by_hash", direct.hash),
            ("block_by_number", local.hash),
            ("transaction_in_block", indexed.hash),
        ])?;

        Ok(direct)
    }
}

/// Demand that every named query path produced the same transaction hash.
pub fn assert_agreement(paths: &[(&'static str, B256)]) -> ChainResult<()> {
    let Some((_, reference)) = paths.first() else {
        return Ok(());
    };
    if paths.iter().all(|(_, hash)| hash == reference) {
        return Ok(());
    }
    let detail = paths
        .iter()
        .map(|(name, hash)| format!("{}={}", name, hash))
        .collect::<Vec<_>>()
        .join(", ");
    Err(ChainError::ConsistencyViolation(format!(
        "query paths disagree: {}",
        detail
    )))
}
