use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::domain::errors::ServiceError;

/// One result row, column name to value.
pub type Row = Map<String, Value>;

/// Data-access handle made available to tools through the execution context.
#[async_trait]
pub trait DataSession: Send + Sync {
    async fn query(&self, statement: &str) -> Result<Vec<Row>, ServiceError>;
}
