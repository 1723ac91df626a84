use amber::domain::errors::ServiceError;
use amber::domain::models::{
    CallerId, Identity, ParameterType, Parameters, PermissionDecision, ToolCategory, ToolMetadata,
    ToolParameter, ToolResult,
};
use amber::domain::ports::{IdentityService, PermissionService};
use amber::services::{ExecutionContext, Tool, ToolOrchestrator, ToolRegistry};
use async_trait::async_trait;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;
use std::sync::Arc;
use tokio::runtime::Runtime;

struct BenchTool {
    name: String,
    requires_auth: bool,
}

#[async_trait]
impl Tool for BenchTool {
    fn metadata(&self) -> ToolMetadata {
        let metadata = ToolMetadata::new(&self.name, "Benchmark tool", ToolCategory::Utility)
            .with_alias(format!("/{}", self.name));
        if self.requires_auth {
            metadata.with_permission("/bench")
        } else {
            metadata.with_auth(false)
        }
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::new("text", ParameterType::String, "Payload").with_min_length(1)]
    }

    async fn execute(
        &self,
        _caller_id: CallerId,
        params: &Parameters,
        _context: &ExecutionContext,
    ) -> anyhow::Result<ToolResult> {
        Ok(ToolResult::success(params["text"].clone()))
    }
}

struct AllowAll;

#[async_trait]
impl IdentityService for AllowAll {
    async fn is_registered(&self, _caller_id: CallerId) -> Result<bool, ServiceError> {
        Ok(true)
    }

    async fn get(&self, caller_id: CallerId) -> Result<Option<Identity>, ServiceError> {
        Ok(Some(Identity::active(caller_id)))
    }
}

#[async_trait]
impl PermissionService for AllowAll {
    async fn check(
        &self,
        _internal_id: i64,
        _permission: &str,
    ) -> Result<PermissionDecision, ServiceError> {
        Ok(PermissionDecision::allow())
    }
}

fn registry_with(count: usize) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for i in 0..count {
        registry
            .register_tool(BenchTool {
                name: format!("tool{i}"),
                requires_auth: i % 2 == 1,
            })
            .unwrap();
    }
    registry
}

/// Benchmark alias lookup as the registry grows
fn benchmark_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("registry_lookup");

    for size in [10usize, 100, 1000] {
        let registry = registry_with(size);
        let alias = format!("/tool{}", size / 2);
        group.bench_with_input(BenchmarkId::from_parameter(size), &alias, |b, alias| {
            b.iter(|| registry.lookup_by_alias(black_box(alias)));
        });
    }

    group.finish();
}

/// Benchmark a full pass through the pipeline
fn benchmark_dispatch(c: &mut Criterion) {
    let runtime = Runtime::new().unwrap();
    let orchestrator = ToolOrchestrator::new(Arc::new(registry_with(2)));
    let services = Arc::new(AllowAll);
    let context = ExecutionContext::builder()
        .with_identity_service(services.clone())
        .with_permission_service(services)
        .build();
    let params: Parameters = serde_json::from_value(json!({ "text": "ping" })).unwrap();

    let mut group = c.benchmark_group("dispatch");

    group.bench_function("no_auth", |b| {
        b.to_async(&runtime).iter(|| {
            orchestrator.execute_command(1, "/tool0", black_box(params.clone()), &context)
        });
    });

    group.bench_function("auth_and_permission", |b| {
        b.to_async(&runtime).iter(|| {
            orchestrator.execute_command(1, "/tool1", black_box(params.clone()), &context)
        });
    });

    group.bench_function("unknown_alias", |b| {
        b.to_async(&runtime).iter(|| {
            orchestrator.execute_command(1, "/missing", black_box(params.clone()), &context)
        });
    });

    group.finish();
}

criterion_group!(benches, benchmark_lookup, benchmark_dispatch);
criterion_main!(benches);
