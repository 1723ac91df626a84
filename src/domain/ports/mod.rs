//! Port trait definitions (Hexagonal Architecture)
//!
//! Narrow async interfaces for the collaborators the dispatch core consumes:
//! - IdentityService: is this caller a known, active identity?
//! - PermissionService: does an identity hold a permission string?
//! - LanguageAgent: opaque text-in/text-out capability used by tools
//! - DataSession: opaque data-access handle used by tools
//! - Transport: the chat envelope a caller id and channel id derive from
//! - AuditSink: destination for post-execution audit records
//!
//! The orchestrator only ever calls IdentityService, PermissionService and
//! AuditSink. The rest are carried in the execution context for tools.

pub mod audit_sink;
pub mod data_session;
pub mod identity_service;
pub mod language_agent;
pub mod permission_service;
pub mod transport;

pub use audit_sink::AuditSink;
pub use data_session::{DataSession, Row};
pub use identity_service::IdentityService;
pub use language_agent::LanguageAgent;
pub use permission_service::PermissionService;
pub use transport::{ChatEnvelope, Transport};
