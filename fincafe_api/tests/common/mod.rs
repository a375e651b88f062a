//! Shared helpers for fincafe_api tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use fincafe_api::{app, AppState};
use fincafe_tenancy::{
    Diagnostics, EmbeddedMigrationRunner, FarmRegistry, MigrationError, MigrationRunner,
    TenancyService,
};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_runner(Arc::new(EmbeddedMigrationRunner::new())).await
    }

    pub async fn with_runner(runner: Arc<dyn MigrationRunner>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let base_url = format!("sqlite://{}/control.db?mode=rwc", dir.path().display());

        let registry = FarmRegistry::connect(&base_url, "customer_")
            .await
            .expect("Failed to open control plane");
        let service = TenancyService::new(&base_url, Duration::from_secs(5), runner)
            .expect("Failed to build tenancy service");

        Self {
            dir,
            state: AppState::new(Arc::new(service), registry),
        }
    }

    pub fn router(&self) -> Router {
        app(self.state.clone())
    }

    pub async fn request(&self, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = self
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri).await
    }

    pub async fn post(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::POST, uri).await
    }
}

/// Fails the first migration with tool output on stderr, then migrates normally
#[derive(Debug, Default)]
pub struct FailingOnceRunner {
    inner: EmbeddedMigrationRunner,
    failed: AtomicBool,
}

pub const TOOL_STDERR: &str = "Error: connection reset by peer while applying migration";

#[async_trait]
impl MigrationRunner for FailingOnceRunner {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(MigrationError::ToolFailed {
                exit_code: Some(1),
                diagnostics: Diagnostics {
                    stdout: "Applying migration 'm20250301_000001_create_farms_table'".to_string(),
                    stderr: TOOL_STDERR.to_string(),
                    ..Default::default()
                },
            });
        }
        self.inner.apply_migrations(database_url).await
    }
}
