//! Confirmation polling.
//!
//! State machine: `Submitted → Pending → Confirmed(Success | Failure)`, with
//! `Aborted` reachable from anywhere. A missing receipt keeps the wait in
//! `Pending`; any other error is fatal. The poller itself has no attempt
//! bound; callers needing a deadline wrap the wait in a timeout or fire the
//! cancellation signal (the facade does the former by default).

use std::time::Duration;

use alloy::primitives::B256;
use tokio::time::interval;

use crate::error::{ChainError, ChainResult};
use crate::lifecycle::Cancel;
use crate::node::LedgerReader;
use crate::types::{ExecutionStatus, Receipt};

/// Terminal outcome of a confirmed transaction.
///
/// `Failure` means the transaction reached the ledger and was included but
/// its execution did not succeed, a business-level outcome distinct from
/// every `ChainError`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Success(Receipt),
    Failure(Receipt),
}

impl Confirmation {
    pub fn receipt(&self) -> &Receipt {
        match self {
            Confirmation::Success(r) | Confirmation::Failure(r) => r,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Confirmation::Success(_))
    }
}

/// Polls for a receipt at a fixed interval until it appears, a fatal error
/// occurs, or the cancellation signal fires.
pub struct ConfirmationPoller<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
    poll_interval: Duration,
}

impl<'a, R: LedgerReader + ?Sized> ConfirmationPoller<'a, R> {
    pub fn new(reader: &'a R, poll_interval: Duration) -> Self {
        Self {
            reader,
            poll_interval,
        }
    }

    /// Wait for the receipt of `tx_hash`.
    ///
    /// `NotFound` is absorbed as "not yet mined"; the node cannot
    /// distinguish that from an unknown hash, so an unbounded wait on a bad
    /// hash is the caller's risk and the cancellation signal their way out.
    /// A signal that fired before this call returns `Cancelled` without
    /// issuing a single poll.
    pub async fn wait(&self, tx_hash: B256, cancel: &Cancel) -> ChainResult<Confirmation> {
        let mut cancelled = cancel.subscribe();
        // The subscription above only delivers triggers that happen after it;
        // the flag covers the ones before.
        if cancel.is_triggered() {
            tracing::info!(tx_hash = %tx_hash, "Confirmation wait cancelled");
            return Err(ChainError::Cancelled { tx_hash });
        }
        let mut ticker = interval(self.poll_interval);

        loop {
            tokio::select! {
                _ = cancelled.recv() => {
                    tracing::info!(tx_hash = %tx_hash, "Confirmation wait cancelled");
                    return Err(ChainError::Cancelled { tx_hash });
                }
                _ = ticker.tick() => {
                    match self.reader.receipt(tx_hash).await {
                        Ok(receipt) => {
                            let confirmation = match receipt.status {
                                ExecutionStatus::Success => Confirmation::Success(receipt),
                                ExecutionStatus::Failure => Confirmation::Failure(receipt),
                            };
                            tracing::info!(
                                tx_hash = %tx_hash,
                                success = confirmation.is_success(),
                                block_number = confirmation.receipt().block_number,
                                "Transaction confirmed"
                            );
                            return Ok(confirmation);
                        }
                        Err(ChainError::NotFound(_)) => {
                            tracing::debug!(tx_hash = %tx_hash, "Transaction pending");
                        }
                        Err(e) => {
                            return Err(ChainError::Aborted {
                                tx_hash,
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        }
    }
}
