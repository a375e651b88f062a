//! Per-farm database lifecycle for FinCafe
//!
//! Every farm (tenant) owns a database named `<prefix><code>`. This crate creates
//! those databases, migrates them to the canonical schema, seeds default roles and
//! permissions, and hands out cached connections to them.

pub mod cache;
pub mod classify;
pub mod db;
pub mod error;
pub mod migrator;
pub mod orchestrator;
pub mod provisioner;
pub mod registry;
pub mod seeder;
pub mod template;
pub mod tenant;

pub use cache::ConnectionCache;
pub use classify::{classify_db_error, FailureClass};
pub use db::Database;
pub use error::{TenancyError, TenantQueryExt};
pub use migrator::{
    CommandMigrationRunner, Diagnostics, EmbeddedMigrationRunner, MigrationError, MigrationReport,
    MigrationRunner, SchemaMigrator,
};
pub use orchestrator::{InitializationReport, TenancyService, TenantOutcome};
pub use provisioner::{DatabaseProvisioner, Provisioned};
pub use registry::FarmRegistry;
pub use seeder::{SeedSummary, Seeder};
pub use template::ConnectionTemplate;
pub use tenant::Tenant;
