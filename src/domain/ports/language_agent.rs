use async_trait::async_trait;

use crate::domain::errors::ServiceError;

/// Opaque "generate text from text" capability.
///
/// Tools call this; the orchestrator never does.
#[async_trait]
pub trait LanguageAgent: Send + Sync {
    async fn process(&self, text: &str) -> Result<String, ServiceError>;
}
