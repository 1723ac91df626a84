//! Domain layer for the Amber dispatch core
//!
//! Tool descriptors, results, the error taxonomy and the collaborator ports.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    AuditError, ContextError, ParameterError, RegistryError, ServiceError, ToolError,
    ToolErrorKind,
};
