//! Connection cache identity and isolation

use fincafe_tenancy::db::entities::crop_types;
use fincafe_tenancy::Tenant;
use sea_orm::{ActiveModelBehavior, ActiveModelTrait, EntityTrait, Set};

mod common;
use common::*;

#[tokio::test]
async fn test_concurrent_requests_share_one_handle() {
    let env = get_test_env();
    let cache = env.service.cache();

    let (a, b, c) = tokio::join!(
        cache.get_connection("customer_test"),
        cache.get_connection("customer_test"),
        cache.get_connection("customer_test")
    );
    let (a, b, c) = (a.unwrap(), b.unwrap(), c.unwrap());

    assert!(a.same_connection(&b));
    assert!(b.same_connection(&c));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_tenants_are_isolated() {
    let env = get_test_env();
    for code in ["alpha", "beta"] {
        let tenant = Tenant::from_code(code, code, TENANT_PREFIX).unwrap();
        env.service.initialize_tenant(&tenant).await.unwrap();
    }

    let alpha = env.service.get_connection("customer_alpha").await.unwrap();
    let beta = env.service.get_connection("customer_beta").await.unwrap();
    assert!(!alpha.same_connection(&beta));

    crop_types::ActiveModel {
        name: Set("Cacao".to_string()),
        ..crop_types::ActiveModel::new()
    }
    .insert(alpha.orm())
    .await
    .unwrap();

    assert_eq!(
        crop_types::Entity::find().all(alpha.orm()).await.unwrap().len(),
        2
    );
    assert_eq!(
        crop_types::Entity::find().all(beta.orm()).await.unwrap().len(),
        1
    );
}
