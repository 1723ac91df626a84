//! Infrastructure layer module
//!
//! Adapters the dispatch core runs against:
//! - Config-backed identity and permission stores
//! - Configuration management
//! - Logging infrastructure and the file audit sink
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod auth;
pub mod config;
pub mod logging;

pub use auth::{StaticIdentityStore, StaticPermissionStore};
