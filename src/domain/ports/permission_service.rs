use async_trait::async_trait;

use crate::domain::errors::ServiceError;
use crate::domain::models::PermissionDecision;

/// Permission checks keyed by the identity's internal id.
///
/// How permissions are computed inside the store is not this crate's concern;
/// implementations only answer allow/deny with a human-readable reason.
#[async_trait]
pub trait PermissionService: Send + Sync {
    async fn check(
        &self,
        internal_id: i64,
        permission: &str,
    ) -> Result<PermissionDecision, ServiceError>;
}
