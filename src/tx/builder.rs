//! Unsigned transaction assembly.
//!
//! The builder fills in everything the caller cannot know locally: the
//! sender's pending nonce, the suggested gas price, and the network
//! identifier. The network identifier is never invented here; it always
//! comes from the node, so the resulting signature can only be valid on the
//! network actually being talked to.

use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, TxKind};

use crate::config::NodeConfig;
use crate::error::{ChainError, ChainResult};
use crate::node::LedgerReader;
use crate::types::TransferIntent;

/// Assembles unsigned transactions from caller intent plus chain state.
pub struct TransactionBuilder<'a, R: LedgerReader + ?Sized> {
    reader: &'a R,
    config: &'a NodeConfig,
}

impl<'a, R: LedgerReader + ?Sized> TransactionBuilder<'a, R> {
    pub fn new(reader: &'a R, config: &'a NodeConfig) -> Self {
        Self { reader, config }
    }

    /// Build an unsigned transaction for `sender`.
    ///
    /// The nonce is the node's pending nonce, fetched once; it is not
    /// re-checked at broadcast time. Fails with `InvalidRequest` on a zero
    /// gas limit and `GasPriceTooHigh` when the suggested price exceeds the
    /// configured ceiling.
    pub async fn build(&self, intent: &TransferIntent, sender: Address) -> ChainResult<TxLegacy> {
        if intent.gas_limit == 0 {
            return Err(ChainError::InvalidRequest("gas limit must be non-zero".into()));
        }

        let nonce = self.reader.pending_nonce(sender).await?;
        let gas_price = self.reader.suggest_gas_price().await?;
        let chain_id = self.reader.network_id().await?;

        let gas_price_gwei = gas_price / 1_000_000_000;
        if gas_price_gwei > self.config.max_gas_price_gwei as u128 {
            return Err(ChainError::GasPriceTooHigh {
                current_gwei: gas_price_gwei as u64,
                max_gwei: self.config.max_gas_price_gwei,
            });
        }
        let adjusted_gas_price = (gas_price as f64 * self.config.gas_price_multiplier) as u128;

        tracing::debug!(
            sender = %sender,
            nonce,
            gas_price = adjusted_gas_price,
            chain_id,
            "Assembled unsigned transaction"
        );

        Ok(TxLegacy {
            chain_id: Some(chain_id),
            nonce,
            gas_price: adjusted_gas_price,
            gas_limit: intent.gas_limit,
            to: intent.to.map_or(TxKind::Create, TxKind::Call),
            value: intent.value,
            input: intent.payload.clone(),
        })
    }
}
