//! Per-address submission serialization.
//!
//! Nonces are assigned per address, monotonically and never reused, so two
//! concurrent submissions from the same key race on the pending nonce and
//! the node rejects one. The lock is held across the whole
//! fetch-nonce → sign → submit sequence; submissions from different
//! addresses proceed in parallel.

use std::sync::Arc;

use alloy::primitives::Address;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// One async mutex per sender address.
#[derive(Debug, Default)]
pub struct NonceLocks {
    locks: DashMap<Address, Arc<Mutex<()>>>,
}

impl NonceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the submission lock for `address`, creating it on first use.
    pub async fn acquire(&self, address: Address) -> OwnedMutexGuard<()> {
        let lock = {
            let entry = self
                .locks
                .entry(address)
                .or_insert_with(|| Arc::new(Mutex::new(())));
            Arc::clone(entry.value())
            // Entry guard drops here, before the await below.
        };
        lock.lock_owned().await
    }
}
