//! Transaction submission.

use alloy::consensus::{Signed, TxLegacy};
use alloy::primitives::B256;

use crate::error::{ChainError, ChainResult};
use crate::node::LedgerWriter;
use crate::tx::signer::{encode_raw, transaction_hash};

/// Submits signed transactions and hands back the hash used for all
/// subsequent confirmation queries.
pub struct Broadcaster<'a, W: LedgerWriter + ?Sized> {
    writer: &'a W,
}

impl<'a, W: LedgerWriter + ?Sized> Broadcaster<'a, W> {
    pub fn new(writer: &'a W) -> Self {
        Self { writer }
    }

    /// Submit a signed transaction.
    ///
    /// A node refusal is `Rejected` and terminal; nothing is retried here.
    /// Every failure past this point carries the locally computed hash so
    /// the caller can investigate the submission out of band: refusals get
    /// it filled into `Rejected`, a lost round trip becomes `Aborted` (the
    /// node may or may not have accepted the transaction). The node must
    /// echo the locally computed content hash, otherwise the submission is
    /// reported as a consistency violation.
    pub async fn submit(&self, signed: &Signed<TxLegacy>) -> ChainResult<B256> {
        let local_hash = transaction_hash(signed);
        let raw = encode_raw(signed);

        let remote_hash = match self.writer.send_raw_transaction(&raw).await {
            Ok(hash) => hash,
            Err(ChainError::Rejected { reason, .. }) => {
                return Err(ChainError::Rejected {
                    tx_hash: Some(local_hash),
                    reason,
                })
            }
            Err(ChainError::TransientIo(reason)) => {
                return Err(ChainError::Aborted {
                    tx_hash: local_hash,
                    reason,
                })
            }
            Err(e) => return Err(e),
        };
        if remote_hash != local_hash {
            return Err(ChainError::ConsistencyViolation(format!(
                "node returned hash {} for submitted transaction {}",
                remote_hash, local_hash
            )));
        }

        tracing::info!(tx_hash = %local_hash, "Transaction broadcast");
        Ok(local_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::NodeConfig;
    use crate::node::{LedgerReader, MockNode};
    use crate::tx::builder::TransactionBuilder;
    use crate::tx::signer::sign_transaction;
    use crate::types::TransferIntent;
    use crate::wallet::Wallet;
    use alloy::primitives::{Address, U256};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    async fn signed_transfer(node: &MockNode, wallet: &Wallet) -> Signed<TxLegacy> {
        let config = NodeConfig::default();
        let intent = TransferIntent::transfer(Address::repeat_byte(0x22), U256::from(1));
        let unsigned = TransactionBuilder::new(node, &config)
            .build(&intent, wallet.address())
            .await
            .unwrap();
        sign_transaction(unsigned, wallet).unwrap()
    }

    #[tokio::test]
    async fn test_submit_returns_content_hash() {
        let node = MockNode::new(31337);
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = signed_transfer(&node, &wallet).await;

        let hash = Broadcaster::new(&node).submit(&signed).await.unwrap();
        assert_eq!(hash, *signed.hash());

        // The node now knows the transaction, still pending.
        let (tx, pending) = node.transaction_by_hash(hash).await.unwrap();
        assert_eq!(tx.hash, hash);
        assert!(pending);
    }

    #[tokio::test]
    async fn test_stale_nonce_is_rejected_terminally() {
        let node = MockNode::new(31337);
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = signed_transfer(&node, &wallet).await;

        // The node moved past this nonce after the transaction was built.
        node.set_pending_nonce(wallet.address(), 10);

        let err = Broadcaster::new(&node).submit(&signed).await.unwrap_err();
        assert!(matches!(err, ChainError::Rejected { .. }));
        assert!(err.to_string().contains("nonce"));
        // The refusal names the transaction it refers to.
        assert_eq!(err.tx_hash(), Some(*signed.hash()));
    }

    #[tokio::test]
    async fn test_lost_round_trip_aborts_with_hash() {
        let node = MockNode::new(31337);
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = signed_transfer(&node, &wallet).await;

        node.inject_io_fault("broken pipe");
        let err = Broadcaster::new(&node).submit(&signed).await.unwrap_err();
        assert!(matches!(err, ChainError::Aborted { .. }));
        assert_eq!(err.tx_hash(), Some(*signed.hash()));
    }
}
