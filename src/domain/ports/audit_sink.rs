use async_trait::async_trait;

use crate::domain::errors::AuditError;
use crate::domain::models::AuditRecord;

/// Destination for audit records.
///
/// Writes are best-effort: the orchestrator logs a failure and moves on, it
/// never changes the invocation result because of one.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError>;
}
