//! Per-invocation execution context.
//!
//! The context bundles the optional collaborators a tool may need. It is
//! assembled by [`ExecutionContextBuilder`] and is read-only afterwards: the
//! orchestrator and tools only ever borrow it.
//!
//! Named services are the one dynamic extension point. They are meant for
//! experimental integrations; tools must probe with [`ExecutionContext::service`]
//! and degrade gracefully when the entry is absent.

use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::domain::errors::ContextError;
use crate::domain::models::{CallerId, ChannelId};
use crate::domain::ports::{DataSession, IdentityService, LanguageAgent, PermissionService, Transport};

type NamedService = Arc<dyn Any + Send + Sync>;

/// Component names accepted by [`ExecutionContext::validate_required`].
pub const COMPONENT_NAMES: [&str; 5] = [
    "transport",
    "data_session",
    "language_agent",
    "identity_service",
    "permission_service",
];

/// Collaborators available to one invocation.
#[derive(Clone, Default)]
pub struct ExecutionContext {
    transport: Option<Arc<dyn Transport>>,
    data_session: Option<Arc<dyn DataSession>>,
    language_agent: Option<Arc<dyn LanguageAgent>>,
    identity_service: Option<Arc<dyn IdentityService>>,
    permission_service: Option<Arc<dyn PermissionService>>,
    services: HashMap<String, NamedService>,
}

impl ExecutionContext {
    pub fn builder() -> ExecutionContextBuilder {
        ExecutionContextBuilder::new()
    }

    pub fn transport(&self) -> Option<&Arc<dyn Transport>> {
        self.transport.as_ref()
    }

    pub fn data_session(&self) -> Option<&Arc<dyn DataSession>> {
        self.data_session.as_ref()
    }

    pub fn language_agent(&self) -> Option<&Arc<dyn LanguageAgent>> {
        self.language_agent.as_ref()
    }

    pub fn identity_service(&self) -> Option<&Arc<dyn IdentityService>> {
        self.identity_service.as_ref()
    }

    pub fn permission_service(&self) -> Option<&Arc<dyn PermissionService>> {
        self.permission_service.as_ref()
    }

    /// Caller id derived from the transport envelope.
    pub fn caller_id(&self) -> Option<CallerId> {
        self.transport.as_ref().and_then(|t| t.caller_id())
    }

    /// Channel id derived from the transport envelope.
    pub fn channel_id(&self) -> Option<ChannelId> {
        self.transport.as_ref().and_then(|t| t.channel_id())
    }

    pub fn username(&self) -> Option<String> {
        self.transport.as_ref().and_then(|t| t.username())
    }

    pub fn has_transport(&self) -> bool {
        self.transport.is_some()
    }

    pub fn has_data_session(&self) -> bool {
        self.data_session.is_some()
    }

    pub fn has_language_agent(&self) -> bool {
        self.language_agent.is_some()
    }

    pub fn has_identity_service(&self) -> bool {
        self.identity_service.is_some()
    }

    pub fn has_permission_service(&self) -> bool {
        self.permission_service.is_some()
    }

    /// Look up a named service of type `T`.
    ///
    /// Returns `None` when the name is absent or registered with another type.
    pub fn service<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        self.services
            .get(name)
            .cloned()
            .and_then(|service| service.downcast::<T>().ok())
    }

    pub fn has_service(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Fail fast with the name of the first unavailable component.
    ///
    /// Components are checked in the order given.
    pub fn validate_required(&self, components: &[&str]) -> Result<(), ContextError> {
        for &component in components {
            let present = match component {
                "transport" => self.has_transport(),
                "data_session" => self.has_data_session(),
                "language_agent" => self.has_language_agent(),
                "identity_service" => self.has_identity_service(),
                "permission_service" => self.has_permission_service(),
                other => return Err(ContextError::UnknownComponent(other.to_string())),
            };
            if !present {
                return Err(ContextError::MissingComponent(component.to_string()));
            }
        }
        Ok(())
    }

    /// Loggable snapshot of what the context carries.
    pub fn summary(&self) -> ContextSummary {
        ContextSummary {
            has_transport: self.has_transport(),
            has_data_session: self.has_data_session(),
            has_language_agent: self.has_language_agent(),
            has_identity_service: self.has_identity_service(),
            has_permission_service: self.has_permission_service(),
            caller_id: self.caller_id(),
            channel_id: self.channel_id(),
            services: self.service_names().into_iter().map(str::to_string).collect(),
        }
    }
}

impl fmt::Debug for ExecutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionContext")
            .field("transport", &self.transport)
            .field("data_session", &self.has_data_session())
            .field("language_agent", &self.has_language_agent())
            .field("identity_service", &self.has_identity_service())
            .field("permission_service", &self.has_permission_service())
            .field("services", &self.service_names())
            .finish()
    }
}

/// Serializable view of an [`ExecutionContext`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContextSummary {
    pub has_transport: bool,
    pub has_data_session: bool,
    pub has_language_agent: bool,
    pub has_identity_service: bool,
    pub has_permission_service: bool,
    pub caller_id: Option<CallerId>,
    pub channel_id: Option<ChannelId>,
    pub services: Vec<String>,
}

/// Accumulates collaborators and produces an immutable [`ExecutionContext`].
#[derive(Default)]
pub struct ExecutionContextBuilder {
    context: ExecutionContext,
}

impl ExecutionContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.context.transport = Some(transport);
        self
    }

    pub fn with_data_session(mut self, session: Arc<dyn DataSession>) -> Self {
        self.context.data_session = Some(session);
        self
    }

    pub fn with_language_agent(mut self, agent: Arc<dyn LanguageAgent>) -> Self {
        self.context.language_agent = Some(agent);
        self
    }

    pub fn with_identity_service(mut self, service: Arc<dyn IdentityService>) -> Self {
        self.context.identity_service = Some(service);
        self
    }

    pub fn with_permission_service(mut self, service: Arc<dyn PermissionService>) -> Self {
        self.context.permission_service = Some(service);
        self
    }

    /// Register an extension service under `name`, replacing any previous entry.
    pub fn with_named_service<T: Any + Send + Sync>(mut self, name: impl Into<String>, service: Arc<T>) -> Self {
        let name = name.into();
        tracing::debug!(service = %name, "Named service added to execution context");
        self.context.services.insert(name, service);
        self
    }

    pub fn build(self) -> ExecutionContext {
        self.context
    }
}
