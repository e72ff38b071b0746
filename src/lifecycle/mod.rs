//! Lifecycle coordination.

pub mod cancel;

pub use cancel::Cancel;
