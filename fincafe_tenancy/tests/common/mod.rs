//! Shared helpers for fincafe_tenancy integration tests
//!
//! Every test gets its own temporary directory holding a SQLite control plane and
//! one SQLite file per tenant database.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Once};
use std::time::Duration;

use async_trait::async_trait;
use fincafe_tenancy::db::entities::{crop_types, permissions, role_permissions, roles};
use fincafe_tenancy::{
    Database, Diagnostics, EmbeddedMigrationRunner, FarmRegistry, MigrationError, MigrationRunner,
    TenancyService,
};
use sea_orm::{
    ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter, Statement,
};
use tempfile::TempDir;

pub const TENANT_PREFIX: &str = "customer_";

static INIT_TRACING: Once = Once::new();

pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("fincafe_tenancy=debug")
            .with_test_writer()
            .try_init();
    });
}

pub struct TestEnv {
    pub dir: TempDir,
    pub base_url: String,
    pub service: TenancyService,
}

impl TestEnv {
    pub fn tenant_path(&self, database_name: &str) -> PathBuf {
        self.dir.path().join(format!("{database_name}.db"))
    }

    pub async fn registry(&self) -> FarmRegistry {
        FarmRegistry::connect(&self.base_url, TENANT_PREFIX)
            .await
            .expect("Failed to open control plane")
    }
}

pub fn get_test_env() -> TestEnv {
    get_test_env_with_runner(Arc::new(EmbeddedMigrationRunner::new()))
}

pub fn get_test_env_with_runner(runner: Arc<dyn MigrationRunner>) -> TestEnv {
    init_tracing();
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let base_url = format!("sqlite://{}/control.db?mode=rwc", dir.path().display());
    let service = TenancyService::new(&base_url, Duration::from_secs(5), runner)
        .expect("Failed to build tenancy service");

    TestEnv {
        dir,
        base_url,
        service,
    }
}

/// Fails the first `apply_migrations` call, then delegates
#[derive(Debug, Default)]
pub struct FailingOnceRunner {
    inner: EmbeddedMigrationRunner,
    failed: AtomicBool,
}

#[async_trait]
impl MigrationRunner for FailingOnceRunner {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError> {
        if !self.failed.swap(true, Ordering::SeqCst) {
            return Err(MigrationError::ToolFailed {
                exit_code: Some(1),
                diagnostics: Diagnostics {
                    stderr: "connection reset during migration".to_string(),
                    ..Default::default()
                },
            });
        }
        self.inner.apply_migrations(database_url).await
    }
}

/// Fails for every URL containing `needle`
#[derive(Debug)]
pub struct SelectiveFailRunner {
    pub needle: String,
    pub inner: EmbeddedMigrationRunner,
}

#[async_trait]
impl MigrationRunner for SelectiveFailRunner {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError> {
        if database_url.contains(&self.needle) {
            return Err(MigrationError::ToolFailed {
                exit_code: Some(2),
                diagnostics: Diagnostics::default(),
            });
        }
        self.inner.apply_migrations(database_url).await
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct DefaultDataCounts {
    pub permissions: u64,
    pub roles: u64,
    pub links: u64,
    pub crop_types: u64,
}

pub async fn default_data_counts(db: &Database) -> DefaultDataCounts {
    DefaultDataCounts {
        permissions: permissions::Entity::find().count(db.orm()).await.unwrap(),
        roles: roles::Entity::find().count(db.orm()).await.unwrap(),
        links: role_permissions::Entity::find().count(db.orm()).await.unwrap(),
        crop_types: crop_types::Entity::find().count(db.orm()).await.unwrap(),
    }
}

/// Row count of any table, including tables without an entity
pub async fn table_row_count(db: &Database, table: &str) -> i64 {
    let conn = db.orm();
    let row = conn
        .query_one(Statement::from_string(
            conn.get_database_backend(),
            format!("SELECT COUNT(*) AS n FROM {table}"),
        ))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "n").unwrap()
}

/// Names of the permissions granted to `role_name`, sorted
pub async fn granted_permissions(db: &Database, role_name: &str) -> Vec<String> {
    let role = roles::Entity::find()
        .filter(roles::Column::Name.eq(role_name))
        .one(db.orm())
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("role {role_name} missing"));

    let mut names: Vec<String> = role
        .find_related(permissions::Entity)
        .all(db.orm())
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.name)
        .collect();
    names.sort();
    names
}
