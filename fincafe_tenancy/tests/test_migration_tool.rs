//! Subprocess migration through the workspace's own `migration` binary
//!
//! Build it first: `cargo build -p migration`, then
//! `cargo test -p fincafe_tenancy --test test_migration_tool -- --ignored`.
//! `FINCAFE_MIGRATION_BIN` overrides the binary location.

use std::path::PathBuf;
use std::sync::Arc;

use fincafe_tenancy::{CommandMigrationRunner, Provisioned, Tenant};

mod common;
use common::*;

fn migration_binary() -> PathBuf {
    std::env::var_os("FINCAFE_MIGRATION_BIN")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../target/debug/migration")
        })
}

#[tokio::test]
#[ignore = "needs the migration binary built"]
async fn test_initialize_with_migration_binary() {
    let binary = migration_binary();
    assert!(binary.exists(), "missing {}", binary.display());

    let runner = CommandMigrationRunner::new(binary, vec!["up".to_string()]);
    let env = get_test_env_with_runner(Arc::new(runner));
    let tenant = Tenant::from_code("test", "Test Farm", TENANT_PREFIX).unwrap();

    let report = env.service.initialize_tenant(&tenant).await.unwrap();
    assert_eq!(report.provisioned, Provisioned::Created);

    let expected: Vec<String> = migration::TABLES
        .iter()
        .enumerate()
        .map(|(i, table)| format!("m20250301_{:06}_create_{}_table", i + 1, table))
        .collect();
    assert_eq!(report.diagnostics.applied, expected);

    let db = env.service.get_connection("customer_test").await.unwrap();
    assert_eq!(
        default_data_counts(&db).await,
        DefaultDataCounts {
            permissions: 10,
            roles: 4,
            links: 21,
            crop_types: 1,
        }
    );

    let again = env.service.initialize_tenant(&tenant).await.unwrap();
    assert_eq!(again.provisioned, Provisioned::AlreadyExisted);
    assert!(again.diagnostics.applied.is_empty());
}
