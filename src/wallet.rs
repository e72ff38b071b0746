//! Key material and address derivation.
//!
//! # Security
//! - Private keys are loaded only from environment variables or caller input
//! - Keys are never logged or serialized
//!
//! The wallet carries no chain id: the network identifier is always fetched
//! from the node at build time so a signature can only ever bind to the
//! network actually being talked to.

use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;

use crate::error::{ChainError, ChainResult};

/// Environment variable name for the private key.
pub const PRIVATE_KEY_ENV_VAR: &str = "LEDGERFLOW_PRIVATE_KEY";

/// Signing key and its derived address.
///
/// The address is the last 20 bytes of the keccak-256 digest of the
/// uncompressed public key (prefix byte excluded), derived once at
/// construction.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// Accepts the key with or without a `0x` prefix. The key is parsed and
    /// held in memory only; it is never logged.
    pub fn from_private_key(private_key_hex: &str) -> ChainResult<Self> {
        let key_hex = private_key_hex.strip_prefix("0x").unwrap_or(private_key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| ChainError::Wallet(format!("Invalid private key format: {}", e)))?;

        tracing::info!(address = %signer.address(), "Wallet initialized");

        Ok(Self { signer })
    }

    /// Load the wallet from the `LEDGERFLOW_PRIVATE_KEY` environment variable.
    pub fn from_env() -> ChainResult<Self> {
        let private_key = std::env::var(PRIVATE_KEY_ENV_VAR).map_err(|_| {
            ChainError::Wallet(format!(
                "Environment variable {} not set",
                PRIVATE_KEY_ENV_VAR
            ))
        })?;

        Self::from_private_key(&private_key)
    }

    /// The address derived from this wallet's public key.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// The underlying signer, for transaction signing.
    pub(crate) fn signer(&self) -> &PrivateKeySigner {
        &self.signer
    }
}
