//! Transaction lifecycle: build, sign, broadcast, confirm.
//!
//! # Data Flow
//! ```text
//! TransferIntent
//!     → builder.rs     (nonce, gas price, network id from the node)
//!     → signer.rs      (EIP-155 signature, sender recovery)
//!     → broadcaster.rs (raw submission, hash echo check)
//!     → poller.rs      (receipt polling under cancellation)
//! ```

pub mod broadcaster;
pub mod builder;
pub mod poller;
pub mod signer;

pub use broadcaster::Broadcaster;
pub use builder::TransactionBuilder;
pub use poller::{Confirmation, ConfirmationPoller};
pub use signer::{encode_raw, recover_sender, sign_transaction, transaction_hash};
