//! Canonical FinCafe schema
//!
//! One ordered migration set is applied to the control-plane database and to every
//! farm database, so all of them share the same table layout.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_farms_table;
mod m20250301_000002_create_permissions_table;
mod m20250301_000003_create_roles_table;
mod m20250301_000004_create_role_permissions_table;
mod m20250301_000005_create_users_table;
mod m20250301_000006_create_crop_types_table;
mod m20250301_000007_create_plots_table;
mod m20250301_000008_create_harvest_collections_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_farms_table::Migration),
            Box::new(m20250301_000002_create_permissions_table::Migration),
            Box::new(m20250301_000003_create_roles_table::Migration),
            Box::new(m20250301_000004_create_role_permissions_table::Migration),
            Box::new(m20250301_000005_create_users_table::Migration),
            Box::new(m20250301_000006_create_crop_types_table::Migration),
            Box::new(m20250301_000007_create_plots_table::Migration),
            Box::new(m20250301_000008_create_harvest_collections_table::Migration),
        ]
    }
}

/// Tables created by the migration set, in creation order
pub const TABLES: [&str; 8] = [
    "farms",
    "permissions",
    "roles",
    "role_permissions",
    "users",
    "crop_types",
    "plots",
    "harvest_collections",
];
