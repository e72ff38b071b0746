//! Transaction lifecycle client for an Ethereum-style ledger node.
//!
//! Reads historical chain data (headers, blocks, transactions, receipts)
//! with cross-path consistency checks, and builds, signs, broadcasts, and
//! confirms new transactions with EIP-155 replay protection.

pub mod client;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod node;
pub mod nonce;
pub mod observability;
pub mod tx;
pub mod types;
pub mod validator;
pub mod wallet;

pub use client::LifecycleClient;
pub use config::NodeConfig;
pub use error::{ChainError, ChainResult};
pub use lifecycle::Cancel;
pub use node::{LedgerNode, LedgerReader, LedgerWriter, MockNode, RpcNode};
pub use tx::Confirmation;
pub use types::{Block, ExecutionStatus, Header, Receipt, TransferIntent, TxRecord};
pub use wallet::Wallet;
