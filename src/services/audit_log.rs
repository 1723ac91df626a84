//! Audit sinks for tool invocations.
//!
//! [`TracingAuditSink`] is the default: one structured log line per record.
//! [`AuditLogService`] keeps a bounded in-memory trail that can be queried
//! for post-hoc analysis and tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::domain::errors::{AuditError, ToolErrorKind};
use crate::domain::models::{AuditConfig, AuditRecord, AuditSinkKind, CallerId};
use crate::domain::ports::AuditSink;
use crate::infrastructure::logging::FileAuditSink;

/// Writes each record as an INFO event on the `amber::audit` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        info!(
            target: "amber::audit",
            record_id = %record.id,
            caller_id = record.caller_id,
            tool = %record.tool_name,
            alias = %record.alias,
            success = record.success,
            error_kind = ?record.error_kind,
            duration_ms = record.duration_ms,
            error = ?record.error,
            "audit"
        );
        Ok(())
    }
}

/// Filter for querying the in-memory trail.
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    pub tool_name: Option<String>,
    pub caller_id: Option<CallerId>,
    pub success: Option<bool>,
    pub error_kind: Option<ToolErrorKind>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl AuditFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tool_name = Some(tool_name.into());
        self
    }

    pub fn with_caller(mut self, caller_id: CallerId) -> Self {
        self.caller_id = Some(caller_id);
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_error_kind(mut self, kind: ToolErrorKind) -> Self {
        self.error_kind = Some(kind);
        self
    }

    pub fn with_time_range(mut self, from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        self.from = Some(from);
        self.to = Some(to);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &AuditRecord) -> bool {
        if let Some(ref tool_name) = self.tool_name {
            if &record.tool_name != tool_name {
                return false;
            }
        }

        if let Some(caller_id) = self.caller_id {
            if record.caller_id != caller_id {
                return false;
            }
        }

        if let Some(success) = self.success {
            if record.success != success {
                return false;
            }
        }

        if let Some(kind) = self.error_kind {
            if record.error_kind != Some(kind) {
                return false;
            }
        }

        if let Some(from) = self.from {
            if record.timestamp < from {
                return false;
            }
        }

        if let Some(to) = self.to {
            if record.timestamp > to {
                return false;
            }
        }

        true
    }
}

/// Statistics about the in-memory trail.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AuditStats {
    pub total_records: usize,
    pub failures: usize,
    pub by_tool: HashMap<String, usize>,
    pub by_error_kind: HashMap<String, usize>,
    pub average_duration_ms: f64,
    pub oldest_record: Option<DateTime<Utc>>,
    pub newest_record: Option<DateTime<Utc>>,
}

/// Bounded in-memory audit trail. Oldest records are evicted first.
#[derive(Debug, Clone)]
pub struct AuditLogService {
    max_entries: usize,
    records: Arc<RwLock<VecDeque<AuditRecord>>>,
}

impl AuditLogService {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries: max_entries.max(1),
            records: Arc::new(RwLock::new(VecDeque::new())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Query records, newest first.
    pub async fn query(&self, filter: AuditFilter) -> Vec<AuditRecord> {
        let records = self.records.read().await;
        let mut results: Vec<AuditRecord> = records
            .iter()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        results.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        if let Some(limit) = filter.limit {
            results.truncate(limit);
        }

        results
    }

    /// Most recent failures.
    pub async fn recent_failures(&self, limit: usize) -> Vec<AuditRecord> {
        self.query(AuditFilter::new().with_success(false).with_limit(limit))
            .await
    }

    pub async fn stats(&self) -> AuditStats {
        let records = self.records.read().await;

        let mut by_tool: HashMap<String, usize> = HashMap::new();
        let mut by_error_kind: HashMap<String, usize> = HashMap::new();
        let mut failures = 0;
        let mut total_duration = 0.0;

        for record in records.iter() {
            *by_tool.entry(record.tool_name.clone()).or_default() += 1;
            if let Some(kind) = record.error_kind {
                *by_error_kind.entry(kind.as_str().to_string()).or_default() += 1;
            }
            if !record.success {
                failures += 1;
            }
            total_duration += record.duration_ms;
        }

        AuditStats {
            total_records: records.len(),
            failures,
            by_tool,
            by_error_kind,
            average_duration_ms: if records.is_empty() {
                0.0
            } else {
                total_duration / records.len() as f64
            },
            oldest_record: records.front().map(|r| r.timestamp),
            newest_record: records.back().map(|r| r.timestamp),
        }
    }

    pub async fn clear(&self) {
        self.records.write().await.clear();
    }

    /// Export matching records as pretty JSON.
    pub async fn export_json(&self, filter: AuditFilter) -> Result<String, AuditError> {
        let records = self.query(filter).await;
        Ok(serde_json::to_string_pretty(&records)?)
    }
}

impl Default for AuditLogService {
    fn default() -> Self {
        Self::new(10_000)
    }
}

#[async_trait]
impl AuditSink for AuditLogService {
    async fn record(&self, record: &AuditRecord) -> Result<(), AuditError> {
        let mut records = self.records.write().await;

        while records.len() >= self.max_entries {
            records.pop_front();
        }

        records.push_back(record.clone());
        Ok(())
    }
}

/// Build the sink selected by the `audit` config section.
pub async fn audit_sink_from_config(config: &AuditConfig) -> Result<Arc<dyn AuditSink>, AuditError> {
    let sink: Arc<dyn AuditSink> = match config.sink {
        AuditSinkKind::Tracing => Arc::new(TracingAuditSink),
        AuditSinkKind::Memory => Arc::new(AuditLogService::new(config.max_entries)),
        AuditSinkKind::File => Arc::new(FileAuditSink::new(&config.path).await?),
    };
    info!(sink = ?config.sink, "Audit sink configured");
    Ok(sink)
}
