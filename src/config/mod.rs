//! Client configuration.
//!
//! # Responsibilities
//! - Declare the configuration schema with serde defaults
//! - Load and validate TOML files, with environment overrides
//!
//! Key material is never part of the configuration file; it is supplied only
//! through the environment (see `wallet`).

pub mod loader;
pub mod schema;

pub use loader::{load_config, validate_config, ConfigError};
pub use schema::NodeConfig;
