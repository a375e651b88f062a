//! In-process migration with the workspace `migration` crate

use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use fincafe_common::{debug, warn};

use super::{Diagnostics, MigrationError, MigrationRunner};
use crate::db::connection::establish_connection;

/// Applies the compiled-in migration set over a short-lived connection
#[derive(Debug, Clone, Default)]
pub struct EmbeddedMigrationRunner;

impl EmbeddedMigrationRunner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MigrationRunner for EmbeddedMigrationRunner {
    async fn apply_migrations(&self, database_url: &str) -> Result<Diagnostics, MigrationError> {
        let conn = establish_connection(database_url)
            .await
            .map_err(MigrationError::Embedded)?;

        let result = async {
            let applied: Vec<String> = Migrator::get_pending_migrations(&conn)
                .await?
                .iter()
                .map(|m| m.name().to_string())
                .collect();
            debug!("Pending migrations: {:?}", applied);

            Migrator::up(&conn, None).await?;
            Ok::<_, sea_orm::DbErr>(applied)
        }
        .await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close migration connection: {}", e);
        }

        result
            .map(|applied| Diagnostics {
                applied,
                ..Default::default()
            })
            .map_err(MigrationError::Embedded)
    }
}
