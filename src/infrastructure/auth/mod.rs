//! Config-backed policy stores
//!
//! Identity and permission lookups answered from the `identities` section of
//! the configuration. Used by the CLI and in tests; deployments with a real
//! user store plug in their own [`IdentityService`]/[`PermissionService`].

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::domain::errors::ServiceError;
use crate::domain::models::{CallerId, Identity, IdentityEntry, PermissionDecision};
use crate::domain::ports::{IdentityService, PermissionService};

/// Identities keyed by caller id.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityStore {
    identities: HashMap<CallerId, Identity>,
}

impl StaticIdentityStore {
    pub fn from_entries(entries: &[IdentityEntry]) -> Self {
        let identities = entries
            .iter()
            .map(|entry| {
                let identity = Identity {
                    internal_id: entry.internal_id,
                    is_active: entry.active,
                    display_name: entry.display_name.clone(),
                };
                (entry.caller_id, identity)
            })
            .collect();
        Self { identities }
    }

    pub fn len(&self) -> usize {
        self.identities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

#[async_trait]
impl IdentityService for StaticIdentityStore {
    async fn is_registered(&self, caller_id: CallerId) -> Result<bool, ServiceError> {
        Ok(self.identities.contains_key(&caller_id))
    }

    async fn get(&self, caller_id: CallerId) -> Result<Option<Identity>, ServiceError> {
        Ok(self.identities.get(&caller_id).cloned())
    }
}

/// Granted permission strings keyed by internal id.
#[derive(Debug, Clone, Default)]
pub struct StaticPermissionStore {
    grants: HashMap<i64, HashSet<String>>,
}

impl StaticPermissionStore {
    pub fn from_entries(entries: &[IdentityEntry]) -> Self {
        let mut grants: HashMap<i64, HashSet<String>> = HashMap::new();
        for entry in entries {
            grants
                .entry(entry.internal_id)
                .or_default()
                .extend(entry.permissions.iter().cloned());
        }
        Self { grants }
    }
}

#[async_trait]
impl PermissionService for StaticPermissionStore {
    async fn check(
        &self,
        internal_id: i64,
        permission: &str,
    ) -> Result<PermissionDecision, ServiceError> {
        let Some(granted) = self.grants.get(&internal_id) else {
            debug!(internal_id, permission, "No grants for identity");
            return Ok(PermissionDecision::deny(format!(
                "insufficient role: no permissions granted for {permission}"
            )));
        };

        if granted.contains(permission) {
            Ok(PermissionDecision::allow())
        } else {
            Ok(PermissionDecision::deny(format!(
                "insufficient role for {permission}"
            )))
        }
    }
}
