//! Layered configuration: built-in defaults, then `.amber/config.yaml`,
//! then `.amber/local.yaml`, then `AMBER_*` environment variables.

pub mod loader;

pub use loader::{ConfigError, ConfigLoader};
