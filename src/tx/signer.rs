//! Signing and sender recovery.
//!
//! Supported scheme: EIP-155 replay-protected legacy transactions only. The
//! unsigned transaction always carries the network identifier, so the
//! signature hash commits to one network; pre-155 ("legacy legacy")
//! signatures are deliberately not produced. Signing the same input twice
//! may yield different signature bytes depending on the scheme nonce; what
//! is stable is that both recover to the same sender.

use alloy::consensus::{SignableTransaction, Signed, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, B256};

use crate::error::{ChainError, ChainResult};
use crate::wallet::Wallet;

/// Sign an unsigned transaction with the wallet's key.
///
/// Fails with `InvalidRequest` if the transaction carries no network
/// identifier; an unprotected signature would be replayable across networks.
pub fn sign_transaction(unsigned: TxLegacy, wallet: &Wallet) -> ChainResult<Signed<TxLegacy>> {
    if unsigned.chain_id.is_none() {
        return Err(ChainError::InvalidRequest(
            "refusing to sign without a network identifier".into(),
        ));
    }

    let mut tx = unsigned;
    let signature = wallet
        .signer()
        .sign_transaction_sync(&mut tx)
        .map_err(|e| ChainError::Wallet(format!("Signing failed: {}", e)))?;

    Ok(tx.into_signed(signature))
}

/// Recover the sender address under the given network identifier.
///
/// The EIP-155 signature hash is recomputed with `network_id` substituted,
/// so recovery with the wrong identifier yields either a different address
/// than the true sender or `InvalidSignature`, never a silent success.
pub fn recover_sender(signed: &Signed<TxLegacy>, network_id: u64) -> ChainResult<Address> {
    let mut tx = signed.tx().clone();
    tx.chain_id = Some(network_id);
    let sighash = tx.signature_hash();

    signed
        .signature()
        .recover_address_from_prehash(&sighash)
        .map_err(|e| ChainError::InvalidSignature(e.to_string()))
}

/// Content hash of a signed transaction; the node returns the same value
/// from submission.
pub fn transaction_hash(signed: &Signed<TxLegacy>) -> B256 {
    *signed.hash()
}

/// Wire encoding for `sendRawTransaction`.
pub fn encode_raw(signed: &Signed<TxLegacy>) -> Vec<u8> {
    let envelope: alloy::consensus::TxEnvelope = signed.clone().into();
    envelope.encoded_2718()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{Address, TxKind, U256};

    const TEST_PRIVATE_KEY: &str =
        "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const NETWORK_ID: u64 = 11155111;

    fn unsigned(nonce: u64) -> TxLegacy {
        TxLegacy {
            chain_id: Some(NETWORK_ID),
            nonce,
            gas_price: 100_000_000_000,
            gas_limit: 21_000,
            to: TxKind::Call(Address::repeat_byte(0x8f)),
            value: U256::from(100_000_000_000_000_000u128),
            input: Default::default(),
        }
    }

    #[test]
    fn test_sign_recover_round_trip() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = sign_transaction(unsigned(0), &wallet).unwrap();

        let sender = recover_sender(&signed, NETWORK_ID).unwrap();
        assert_eq!(sender, wallet.address());
    }

    #[test]
    fn test_double_sign_recovers_same_address() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let first = sign_transaction(unsigned(5), &wallet).unwrap();
        let second = sign_transaction(unsigned(5), &wallet).unwrap();

        // Byte-identity of the signatures is not required; agreeing on the
        // sender is.
        assert_eq!(
            recover_sender(&first, NETWORK_ID).unwrap(),
            recover_sender(&second, NETWORK_ID).unwrap(),
        );
        assert_eq!(first.hash(), second.hash());
    }

    #[test]
    fn test_wrong_network_id_never_recovers_true_sender() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = sign_transaction(unsigned(0), &wallet).unwrap();

        match recover_sender(&signed, NETWORK_ID + 1) {
            Ok(other) => assert_ne!(other, wallet.address()),
            Err(ChainError::InvalidSignature(_)) => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_refuses_unprotected_signing() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let mut tx = unsigned(0);
        tx.chain_id = None;
        assert!(matches!(
            sign_transaction(tx, &wallet),
            Err(ChainError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_raw_encoding_is_stable_for_one_signature() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let signed = sign_transaction(unsigned(1), &wallet).unwrap();
        let raw = encode_raw(&signed);
        assert!(!raw.is_empty());
        assert_eq!(raw, encode_raw(&signed));
    }
}
