//! Observability subsystem.
//!
//! Structured logging only; every component emits `tracing` events and the
//! caller decides where they go.

pub mod logging;
