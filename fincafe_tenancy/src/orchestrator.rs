//! Tenant lifecycle: create the database, migrate it, seed it
//!
//! There is no stored "ready" flag. Every step is idempotent, so re-running
//! initialization is how a partially initialized tenant is repaired.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use fincafe_common::{error, info, warn, MigrationMode, Settings};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::ConnectionCache;
use crate::db::Database;
use crate::error::TenancyError;
use crate::migrator::{
    CommandMigrationRunner, Diagnostics, EmbeddedMigrationRunner, MigrationReport, MigrationRunner,
    SchemaMigrator,
};
use crate::provisioner::{DatabaseProvisioner, Provisioned};
use crate::registry::FarmRegistry;
use crate::seeder::{SeedSummary, Seeder};
use crate::template::ConnectionTemplate;
use crate::tenant::{validate_database_name, Tenant};

/// What an initialization run did
#[derive(Debug, Clone, Serialize)]
pub struct InitializationReport {
    pub code: String,
    pub database_name: String,
    pub provisioned: Provisioned,
    pub diagnostics: Diagnostics,
    pub seed: SeedSummary,
}

/// Outcome of one tenant in a bulk migration
#[derive(Debug)]
pub struct TenantOutcome {
    pub code: String,
    pub database_name: String,
    pub result: Result<InitializationReport, TenancyError>,
}

pub struct TenancyService {
    cache: Arc<ConnectionCache>,
    provisioner: DatabaseProvisioner,
    migrator: SchemaMigrator,
    /// Serializes initialization per database name
    init_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TenancyService {
    pub fn new(
        base_url: &str,
        acquire_timeout: Duration,
        runner: Arc<dyn MigrationRunner>,
    ) -> Result<Self, TenancyError> {
        let template = ConnectionTemplate::parse(base_url)?;
        let cache = Arc::new(ConnectionCache::new(template.clone(), acquire_timeout));
        let seeder = Seeder::new(cache.clone());

        Ok(Self {
            provisioner: DatabaseProvisioner::new(template.clone()),
            migrator: SchemaMigrator::new(template, runner, seeder),
            cache,
            init_locks: DashMap::new(),
        })
    }

    /// Build the service with the runner selected by `settings.migration_mode`
    pub fn from_settings(settings: &Settings) -> Result<Self, TenancyError> {
        let runner: Arc<dyn MigrationRunner> = match settings.migration_mode {
            MigrationMode::Embedded => Arc::new(EmbeddedMigrationRunner::new()),
            MigrationMode::Command => Arc::new(CommandMigrationRunner::sea_orm_cli(
                settings.migration_program.clone(),
                &settings.migration_dir,
            )),
        };
        Self::new(&settings.database_url, settings.acquire_timeout, runner)
    }

    pub fn cache(&self) -> &Arc<ConnectionCache> {
        &self.cache
    }

    pub async fn get_connection(&self, database_name: &str) -> Result<Database, TenancyError> {
        self.cache.get_connection(database_name).await
    }

    pub async fn create_database(&self, database_name: &str) -> Result<Provisioned, TenancyError> {
        self.provisioner.create_database(database_name).await
    }

    /// Migrate and seed an existing database
    pub async fn migrate(&self, database_name: &str) -> Result<MigrationReport, TenancyError> {
        validate_database_name(database_name)?;
        self.migrator.migrate(database_name).await
    }

    /// Create, migrate and seed the tenant's database
    ///
    /// Concurrent calls for the same tenant run one after another. A failure at any
    /// step is returned as-is and leaves the tenant safe to initialize again.
    pub async fn initialize_tenant(
        &self,
        tenant: &Tenant,
    ) -> Result<InitializationReport, TenancyError> {
        let database_name = tenant.database_name.as_str();
        validate_database_name(database_name)?;

        let lock = self
            .init_locks
            .entry(database_name.to_string())
            .or_default()
            .clone();
        let _guard = lock.lock().await;

        info!("Initializing farm {} ({})", tenant.code, database_name);

        let provisioned = self.provisioner.create_database(database_name).await?;
        let report = self.migrator.migrate(database_name).await?;

        info!("Farm {} initialized", tenant.code);
        Ok(InitializationReport {
            code: tenant.code.clone(),
            database_name: database_name.to_string(),
            provisioned,
            diagnostics: report.diagnostics,
            seed: report.seed,
        })
    }

    /// Initialize every active farm, continuing past failures
    pub async fn migrate_all_active(
        &self,
        registry: &FarmRegistry,
    ) -> Result<Vec<TenantOutcome>, TenancyError> {
        let tenants = registry.list_active().await?;
        info!("Migrating {} active farm(s)", tenants.len());

        let mut outcomes = Vec::with_capacity(tenants.len());
        for tenant in tenants {
            let result = self.initialize_tenant(&tenant).await;
            if let Err(e) = &result {
                error!("Farm {} failed to migrate: {}", tenant.code, e);
            }
            outcomes.push(TenantOutcome {
                code: tenant.code,
                database_name: tenant.database_name,
                result,
            });
        }

        let failed = outcomes.iter().filter(|o| o.result.is_err()).count();
        if failed > 0 {
            warn!("{} of {} farm(s) failed to migrate", failed, outcomes.len());
        }
        Ok(outcomes)
    }

    /// Close every cached tenant connection
    pub async fn close_all(&self) -> usize {
        self.cache.close_all().await
    }
}
