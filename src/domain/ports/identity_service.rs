use async_trait::async_trait;

use crate::domain::errors::ServiceError;
use crate::domain::models::{CallerId, Identity};

/// Lookup of caller identities.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Whether the caller has registered at all.
    async fn is_registered(&self, caller_id: CallerId) -> Result<bool, ServiceError>;

    /// Fetch the caller's identity, if any.
    async fn get(&self, caller_id: CallerId) -> Result<Option<Identity>, ServiceError>;
}
