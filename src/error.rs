//! Error taxonomy for ledger operations.
//!
//! The `NotFound` / `TransientIo` split matters: a missing receipt during
//! confirmation polling is an expected condition, not a failure, while a
//! transport error always aborts the wait.

use alloy::primitives::B256;
use thiserror::Error;

/// Errors surfaced by ledger queries and the transaction lifecycle.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Network or timeout failure. Safe to retry at the caller's discretion.
    #[error("transient I/O failure: {0}")]
    TransientIo(String),

    /// Entity unknown to the queried node. Terminal everywhere except the
    /// confirmation poller, which absorbs it while waiting for a receipt.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Node refused a submitted transaction (stale nonce, insufficient funds,
    /// malformed payload). Terminal; the caller must intervene. The hash is
    /// filled in once the refused transaction has been signed, so callers
    /// can correlate the refusal with what they submitted.
    #[error("transaction rejected by node: {reason}")]
    Rejected {
        tx_hash: Option<B256>,
        reason: String,
    },

    /// Sender recovery failed. Wrong network identifier or corrupted signature.
    #[error("invalid signature: {0}")]
    InvalidSignature(String),

    /// Independent query paths disagreed about the same data. Never resolved
    /// by preferring one source.
    #[error("consistency violation: {0}")]
    ConsistencyViolation(String),

    /// Invalid private key format or signing failure.
    #[error("wallet error: {0}")]
    Wallet(String),

    /// Caller-supplied transaction fields failed validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Suggested gas price exceeded the configured ceiling.
    #[error("gas price {current_gwei} gwei exceeds maximum {max_gwei} gwei")]
    GasPriceTooHigh { current_gwei: u64, max_gwei: u64 },

    /// Connected node reports a different chain than configured.
    #[error("chain id mismatch: expected {expected}, got {actual}")]
    ChainMismatch { expected: u64, actual: u64 },

    /// A lifecycle step failed fatally after the transaction hash was known:
    /// the submission round trip was lost, or confirmation polling hit a
    /// fatal error. Carries the hash so the caller can investigate the
    /// transaction out of band.
    #[error("lifecycle aborted for {tx_hash}: {reason}")]
    Aborted { tx_hash: B256, reason: String },

    /// Confirmation wait was cancelled externally before a receipt appeared.
    #[error("confirmation cancelled while waiting for {tx_hash}")]
    Cancelled { tx_hash: B256 },

    /// No receipt within the configured confirmation deadline.
    #[error("transaction {tx_hash} unconfirmed after {waited_secs}s")]
    ConfirmationTimeout { tx_hash: B256, waited_secs: u64 },
}

impl ChainError {
    /// The transaction hash this error relates to, if the operation had
    /// already produced one.
    pub fn tx_hash(&self) -> Option<B256> {
        match self {
            ChainError::Aborted { tx_hash, .. }
            | ChainError::Cancelled { tx_hash }
            | ChainError::ConfirmationTimeout { tx_hash, .. } => Some(*tx_hash),
            ChainError::Rejected { tx_hash, .. } => *tx_hash,
            _ => None,
        }
    }
}

/// Result type for ledger operations.
pub type ChainResult<T> = Result<T, ChainError>;
