//! Cancellation coordination for confirmation waits.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::broadcast;

/// Level-triggered cancellation signal for in-flight waits.
///
/// Once fired, the signal stays fired: a wait that subscribes after the
/// trigger still observes the cancellation, so a shutdown racing ahead of a
/// confirmation wait cannot be lost. Waiters subscribe to the broadcast
/// channel for the wakeup and consult the fired flag to close the
/// subscribe-after-trigger window.
pub struct Cancel {
    fired: AtomicBool,
    tx: broadcast::Sender<()>,
}

impl Cancel {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            fired: AtomicBool::new(false),
            tx,
        }
    }

    /// Subscribe to the cancellation wakeup.
    ///
    /// Check [`Cancel::is_triggered`] after subscribing; a trigger that fired
    /// before the subscription is visible only through the flag.
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Fire the cancellation signal. Idempotent; the signal never resets.
    pub fn trigger(&self) {
        self.fired.store(true, Ordering::SeqCst);
        let _ = self.tx.send(());
    }

    /// Whether the signal has fired.
    pub fn is_triggered(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }
}

impl Default for Cancel {
    fn default() -> Self {
        Self::new()
    }
}
