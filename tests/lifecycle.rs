//! Write-path integration tests: build, sign, broadcast, confirm, and the
//! failure modes in between.

use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use ledgerflow::types::ExecutionStatus;
use ledgerflow::{
    Cancel, ChainError, Confirmation, LifecycleClient, MockNode, NodeConfig, TransferIntent, Wallet,
};

mod common;
use common::*;

fn test_client(node: MockNode) -> LifecycleClient<MockNode> {
    LifecycleClient::with_node(node, fast_config())
}

fn intent() -> TransferIntent {
    TransferIntent::transfer(Address::repeat_byte(0x8f), U256::from(100))
}

#[tokio::test]
async fn test_transfer_confirms_success() {
    ledgerflow::observability::logging::init();
    let node = MockNode::new(11_155_111);
    // The receipt shows up only after a few pending polls.
    node.set_receipt_delay(3);
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let confirmation = client
        .transfer(&intent(), &wallet, &Cancel::new())
        .await
        .unwrap();

    assert!(confirmation.is_success());
    assert!(confirmation.receipt().block_number > 0);
}

#[tokio::test]
async fn test_sent_transaction_is_pending_until_confirmed() {
    let node = MockNode::new(11_155_111);
    node.set_receipt_delay(2);
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();

    let (_, pending) = client.transaction_by_hash(tx_hash).await.unwrap();
    assert!(pending);

    client
        .await_confirmation(tx_hash, &Cancel::new())
        .await
        .unwrap();

    let (_, pending) = client.transaction_by_hash(tx_hash).await.unwrap();
    assert!(!pending);
}

#[tokio::test]
async fn test_reverted_execution_is_confirmed_failure() {
    let node = MockNode::new(11_155_111);
    node.set_next_status(ExecutionStatus::Failure);
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let confirmation = client
        .transfer(&intent(), &wallet, &Cancel::new())
        .await
        .unwrap();

    // Included but reverted: a terminal outcome, not a ChainError.
    assert!(matches!(confirmation, Confirmation::Failure(_)));
}

#[tokio::test]
async fn test_stale_nonce_is_rejected() {
    let node = MockNode::new(11_155_111);
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    // Sign once, submit twice: the second copy carries a nonce the node has
    // already consumed.
    let unsigned = ledgerflow::tx::TransactionBuilder::new(client.node(), client.config())
        .build(&intent(), wallet.address())
        .await
        .unwrap();
    let signed = ledgerflow::tx::sign_transaction(unsigned, &wallet).unwrap();
    let broadcaster = ledgerflow::tx::Broadcaster::new(client.node());

    let first = broadcaster.submit(&signed).await.unwrap();
    let err = broadcaster.submit(&signed).await.unwrap_err();

    match &err {
        ChainError::Rejected { reason, .. } => assert!(reason.contains("nonce")),
        other => panic!("expected Rejected, got {other}"),
    }
    // The refusal reports the hash of the transaction it turned away.
    assert_eq!(err.tx_hash(), Some(*signed.hash()));
    // The first submission is unaffected.
    assert!(client.transaction_by_hash(first).await.is_ok());
}

#[tokio::test]
async fn test_cancellation_aborts_eternal_pending() {
    let node = MockNode::new(11_155_111);
    let config = NodeConfig {
        poll_interval_ms: 5,
        confirmation_timeout_secs: 0, // no deadline: cancellation is the only exit
        ..Default::default()
    };
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let client = Arc::new(LifecycleClient::with_node(node, config));

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();
    client.node().withhold_receipt(tx_hash);

    let cancel = Arc::new(Cancel::new());
    let waiter = {
        let client = Arc::clone(&client);
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move { client.await_confirmation(tx_hash, &cancel).await })
    };

    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!waiter.is_finished(), "poller must stay pending, not fabricate a receipt");

    cancel.trigger();
    let err = waiter.await.unwrap().unwrap_err();
    assert!(matches!(err, ChainError::Cancelled { .. }));
    assert_eq!(err.tx_hash(), Some(tx_hash));
}

#[tokio::test]
async fn test_cancellation_before_wait_still_cancels() {
    let node = MockNode::new(11_155_111);
    let config = NodeConfig {
        poll_interval_ms: 5,
        confirmation_timeout_secs: 0, // no deadline to bail us out
        ..Default::default()
    };
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let client = LifecycleClient::with_node(node, config);

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();
    client.node().withhold_receipt(tx_hash);

    // Shutdown raced ahead of the wait: the signal fires before
    // await_confirmation subscribes. The wait must still observe it
    // instead of polling forever.
    let cancel = Cancel::new();
    cancel.trigger();

    let err = client
        .await_confirmation(tx_hash, &cancel)
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Cancelled { .. }));
    assert_eq!(err.tx_hash(), Some(tx_hash));
}

#[tokio::test]
async fn test_confirmation_deadline_fires() {
    let node = MockNode::new(11_155_111);
    let config = NodeConfig {
        poll_interval_ms: 5,
        confirmation_timeout_secs: 1,
        ..Default::default()
    };
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
    let client = LifecycleClient::with_node(node, config);

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();
    client.node().withhold_receipt(tx_hash);

    let err = client
        .await_confirmation(tx_hash, &Cancel::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::ConfirmationTimeout { .. }));
    assert_eq!(err.tx_hash(), Some(tx_hash));
}

#[tokio::test]
async fn test_io_failure_during_polling_aborts() {
    let node = MockNode::new(11_155_111);
    node.set_receipt_delay(100);
    node.inject_receipt_fault("gateway unreachable");
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();
    let err = client
        .await_confirmation(tx_hash, &Cancel::new())
        .await
        .unwrap_err();
    assert!(matches!(err, ChainError::Aborted { .. }));
    assert_eq!(err.tx_hash(), Some(tx_hash));
}

#[tokio::test]
async fn test_concurrent_same_address_submissions_serialize() {
    let node = MockNode::new(11_155_111);
    let client = Arc::new(test_client(node));
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let mut handles = Vec::new();
    for _ in 0..4 {
        let client = Arc::clone(&client);
        let wallet = wallet.clone();
        handles.push(tokio::spawn(async move {
            client.build_and_send(&intent(), &wallet).await
        }));
    }

    for handle in handles {
        handle.await.unwrap().expect("serialized submissions must not race on the nonce");
    }
    // Four transactions accepted means four sequential nonces were used.
    assert_eq!(client.pending_nonce(wallet.address()).await.unwrap(), 4);
}

#[tokio::test]
async fn test_sender_recovery_sees_submitted_transaction() {
    let node = MockNode::new(11_155_111);
    let client = test_client(node);
    let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();

    let tx_hash = client.build_and_send(&intent(), &wallet).await.unwrap();

    // The mock node accepted the submission only because sender recovery
    // (and therefore the embedded network id) matched its own chain.
    let (tx, _) = client.transaction_by_hash(tx_hash).await.unwrap();
    assert_eq!(tx.to, Some(Address::repeat_byte(0x8f)));
    assert_eq!(tx.nonce, 0);
}
