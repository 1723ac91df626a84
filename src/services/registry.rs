//! Tool registry.
//!
//! Maps tool names and invocation aliases to shared [`ToolHandle`]s, with a
//! derived category index. The registry is populated during start-up and then
//! shared behind an `Arc`; mutation takes `&mut self`, so registering while
//! serving traffic requires the owner to hold the only reference.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{RegistryError, ToolError};
use crate::domain::models::{CallerId, ToolCategory};
use crate::domain::ports::{IdentityService, PermissionService};
use crate::services::tool::{Tool, ToolHandle};

/// Registry counts, for `amber tools list` and diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub total_tools: usize,
    pub total_aliases: usize,
    pub by_category: BTreeMap<String, usize>,
}

/// Name and alias lookup for registered tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    by_name: HashMap<String, Arc<ToolHandle>>,
    by_alias: HashMap<String, Arc<ToolHandle>>,
    categories: HashMap<ToolCategory, BTreeSet<String>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validated tool.
    ///
    /// Name and alias collisions are checked before anything is inserted, so a
    /// failed registration leaves the registry unchanged.
    #[instrument(skip(self, handle), fields(tool = %handle.name()))]
    pub fn register(&mut self, handle: ToolHandle) -> Result<(), RegistryError> {
        let name = handle.name().to_string();

        if self.by_name.contains_key(&name) {
            return Err(RegistryError::DuplicateName(name));
        }
        for alias in handle.aliases() {
            if let Some(owner) = self.by_alias.get(alias) {
                return Err(RegistryError::DuplicateAlias {
                    alias: alias.clone(),
                    owner: owner.name().to_string(),
                });
            }
        }

        let handle = Arc::new(handle);
        for alias in handle.aliases() {
            self.by_alias.insert(alias.clone(), Arc::clone(&handle));
        }
        self.categories
            .entry(handle.category())
            .or_default()
            .insert(name.clone());

        info!(
            aliases = ?handle.aliases(),
            category = %handle.category(),
            "Tool registered"
        );
        self.by_name.insert(name, handle);

        Ok(())
    }

    /// Wrap `tool` in a [`ToolHandle`] and register it.
    pub fn register_tool<T: Tool + 'static>(&mut self, tool: T) -> Result<(), ToolError> {
        let handle = ToolHandle::new(tool)?;
        self.register(handle)?;
        Ok(())
    }

    /// Remove a tool with all its aliases. Returns whether it was registered.
    #[instrument(skip(self))]
    pub fn unregister(&mut self, name: &str) -> bool {
        let Some(handle) = self.by_name.remove(name) else {
            debug!("Tool not registered, nothing to remove");
            return false;
        };

        for alias in handle.aliases() {
            self.by_alias.remove(alias);
        }
        if let Some(names) = self.categories.get_mut(&handle.category()) {
            names.remove(name);
            if names.is_empty() {
                self.categories.remove(&handle.category());
            }
        }

        info!("Tool unregistered");
        true
    }

    pub fn lookup_by_name(&self, name: &str) -> Option<Arc<ToolHandle>> {
        self.by_name.get(name).cloned()
    }

    pub fn lookup_by_alias(&self, alias: &str) -> Option<Arc<ToolHandle>> {
        self.by_alias.get(alias).cloned()
    }

    /// Tools in `category`, ordered by name.
    pub fn by_category(&self, category: ToolCategory) -> Vec<Arc<ToolHandle>> {
        self.categories
            .get(&category)
            .map(|names| {
                names
                    .iter()
                    .filter_map(|name| self.by_name.get(name).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every registered tool, ordered by name.
    pub fn all(&self) -> Vec<Arc<ToolHandle>> {
        let mut tools: Vec<Arc<ToolHandle>> = self.by_name.values().cloned().collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Every registered alias, sorted.
    pub fn alias_list(&self) -> Vec<String> {
        let mut aliases: Vec<String> = self.by_alias.keys().cloned().collect();
        aliases.sort();
        aliases
    }

    pub fn get_commands_count(&self) -> usize {
        self.by_name.len()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        warn!(
            tools = self.by_name.len(),
            aliases = self.by_alias.len(),
            "Clearing tool registry"
        );
        self.by_name.clear();
        self.by_alias.clear();
        self.categories.clear();
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            total_tools: self.by_name.len(),
            total_aliases: self.by_alias.len(),
            by_category: self
                .categories
                .iter()
                .map(|(category, names)| (category.as_str().to_string(), names.len()))
                .collect(),
        }
    }

    /// Tools `caller_id` may run, ordered by name.
    ///
    /// Mirrors the orchestrator's policy stages. Tools with no permissions
    /// and no auth are always listed; auth-only tools need a known, active
    /// identity. Any tool declaring permissions, whether or not it requires
    /// auth, is listed only when the identity holds every one of them, so
    /// without both services it is left out. Lookup errors exclude the tool.
    pub async fn available_for(
        &self,
        caller_id: CallerId,
        identity: Option<&dyn IdentityService>,
        permissions: Option<&dyn PermissionService>,
    ) -> Vec<Arc<ToolHandle>> {
        let internal_id = match identity {
            Some(service) => match service.get(caller_id).await {
                Ok(Some(found)) if found.is_active => Some(found.internal_id),
                Ok(_) => None,
                Err(e) => {
                    warn!(caller_id, error = %e, "Identity lookup failed while listing tools");
                    None
                }
            },
            None => None,
        };

        let mut available = Vec::new();
        for tool in self.all() {
            if tool.required_permissions().is_empty() {
                if !tool.requires_auth() || internal_id.is_some() {
                    available.push(tool);
                }
                continue;
            }
            let (Some(internal_id), Some(permissions)) = (internal_id, permissions) else {
                continue;
            };

            let mut granted = true;
            for permission in tool.required_permissions() {
                match permissions.check(internal_id, permission).await {
                    Ok(decision) if decision.allowed => {}
                    _ => {
                        granted = false;
                        break;
                    }
                }
            }
            if granted {
                available.push(tool);
            }
        }
        available
    }
}
