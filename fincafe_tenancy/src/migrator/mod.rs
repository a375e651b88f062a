//! Bring a tenant database to the canonical schema and default data
//!
//! Schema changes are delegated to a [`MigrationRunner`]. The runner owns the location
//! of the canonical migration set; callers only say which database to migrate.

mod command;
mod embedded;

pub use command::CommandMigrationRunner;
pub use embedded::EmbeddedMigrationRunner;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sea_orm::DbErr;
use serde::Serialize;
use thiserror::Error;
use fincafe_common::{info, warn};

use crate::error::TenancyError;
use crate::seeder::{SeedSummary, Seeder};
use crate::template::{redact_url, ConnectionTemplate};

/// What a migration run reported
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// Names of migrations applied by this run, oldest first
    pub applied: Vec<String>,
    pub stdout: String,
    pub stderr: String,
}

impl Diagnostics {
    /// Tool output worth showing to an operator; stderr first
    pub fn output(&self) -> String {
        [self.stderr.trim(), self.stdout.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("failed to launch migration tool '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("migration tool exited with {}: {}", exit_label(.exit_code), .diagnostics.output())]
    ToolFailed {
        exit_code: Option<i32>,
        diagnostics: Diagnostics,
    },

    #[error("migration tool did not finish within {0:?}")]
    TimedOut(Duration),

    #[error("{0}")]
    Embedded(#[source] DbErr),
}

impl MigrationError {
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        match self {
            MigrationError::ToolFailed { diagnostics, .. } => Some(diagnostics),
            _ => None,
        }
    }
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {code}"),
        None => "a signal".to_string(),
    }
}

/// Applies the canonical schema to the database behind a connection URL
#[async_trait]
pub trait MigrationRunner: Send + Sync + fmt::Debug {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError>;
}

/// Result of migrating one tenant database
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub diagnostics: Diagnostics,
    pub seed: SeedSummary,
}

/// Runs schema migration followed by default-data seeding
#[derive(Debug, Clone)]
pub struct SchemaMigrator {
    template: ConnectionTemplate,
    runner: Arc<dyn MigrationRunner>,
    seeder: Seeder,
}

impl SchemaMigrator {
    pub fn new(template: ConnectionTemplate, runner: Arc<dyn MigrationRunner>, seeder: Seeder) -> Self {
        Self {
            template,
            runner,
            seeder,
        }
    }

    /// Apply the canonical schema to `database_name`, then seed default data
    ///
    /// Seeding never runs when the schema step fails.
    pub async fn migrate(&self, database_name: &str) -> Result<MigrationReport, TenancyError> {
        let url = self.template.tenant_url(database_name);
        info!(
            "Migrating database {} ({})",
            database_name,
            redact_url(&url)
        );

        let diagnostics = self.runner.apply_migrations(&url).await.map_err(|e| {
            warn!("Migration of {} failed: {}", database_name, e);
            e
        })?;

        if diagnostics.applied.is_empty() {
            info!("Database {} schema already up to date", database_name);
        } else {
            info!(
                "Applied {} migration(s) to {}: {}",
                diagnostics.applied.len(),
                database_name,
                diagnostics.applied.join(", ")
            );
        }

        let seed = self.seeder.seed(database_name).await?;

        Ok(MigrationReport { diagnostics, seed })
    }
}
