//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber for binaries and examples
//! - Keep the log level configurable via `RUST_LOG`
//!
//! Library code only emits `tracing` events; installing a subscriber is the
//! embedding application's choice, with this as a convenient default.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a subscriber reading `RUST_LOG`, defaulting to debug-level events
/// from this crate. Safe to call once per process; later calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ledgerflow=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
