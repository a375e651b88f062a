//! Farm registry and bulk migration over the control plane

use std::sync::Arc;

use fincafe_tenancy::{EmbeddedMigrationRunner, TenancyError};

mod common;
use common::*;

#[tokio::test]
async fn test_register_and_find() {
    let env = get_test_env();
    let registry = env.registry().await;

    let tenant = registry
        .register("north-ridge", "North Ridge", Some("Highland estate"))
        .await
        .unwrap();
    assert_eq!(tenant.database_name, "customer_north_ridge");
    assert!(tenant.is_active);

    let found = registry.find_by_code("north-ridge").await.unwrap();
    assert_eq!(found, Some(tenant));
    assert!(registry.find_by_code("south-ridge").await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_and_invalid_codes() {
    let env = get_test_env();
    let registry = env.registry().await;

    registry.register("demo-farm", "Demo Farm", None).await.unwrap();
    let err = registry
        .register("demo-farm", "Demo Farm Again", None)
        .await
        .unwrap_err();
    assert!(matches!(err, TenancyError::FarmExists(_)), "{err:?}");

    let err = registry.register("Demo_Farm", "Bad", None).await.unwrap_err();
    assert!(matches!(err, TenancyError::InvalidCode(_)), "{err:?}");

    let existing = registry
        .ensure_registered("demo-farm", "ignored", None)
        .await
        .unwrap();
    assert_eq!(existing.name, "Demo Farm");
}

#[tokio::test]
async fn test_resolve_active() {
    let env = get_test_env();
    let registry = env.registry().await;
    registry.register("dormant", "Dormant Farm", None).await.unwrap();
    registry.set_active("dormant", false).await.unwrap();

    assert!(matches!(
        registry.resolve_active("dormant").await,
        Err(TenancyError::FarmInactive(_))
    ));
    assert!(matches!(
        registry.resolve_active("unknown").await,
        Err(TenancyError::FarmNotFound(_))
    ));

    registry.set_active("dormant", true).await.unwrap();
    assert_eq!(
        registry.resolve_active("dormant").await.unwrap().database_name,
        "customer_dormant"
    );
}

#[tokio::test]
async fn test_migrate_all_active_continues_past_failures() {
    let env = get_test_env_with_runner(Arc::new(SelectiveFailRunner {
        needle: "customer_broken".to_string(),
        inner: EmbeddedMigrationRunner::new(),
    }));
    let registry = env.registry().await;
    registry.register("alpha", "Alpha", None).await.unwrap();
    registry.register("broken", "Broken", None).await.unwrap();
    registry.register("gamma", "Gamma", None).await.unwrap();
    registry.register("retired", "Retired", None).await.unwrap();
    registry.set_active("retired", false).await.unwrap();

    let outcomes = env.service.migrate_all_active(&registry).await.unwrap();
    let summary: Vec<(&str, bool)> = outcomes
        .iter()
        .map(|o| (o.code.as_str(), o.result.is_ok()))
        .collect();
    assert_eq!(
        summary,
        vec![("alpha", true), ("broken", false), ("gamma", true)]
    );

    assert!(env.tenant_path("customer_gamma").exists());
    assert!(!env.tenant_path("customer_retired").exists());

    let gamma = env.service.get_connection("customer_gamma").await.unwrap();
    assert_eq!(default_data_counts(&gamma).await.roles, 4);
}
