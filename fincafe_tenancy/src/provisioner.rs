//! Create tenant databases on the database server

use std::io::ErrorKind;

use sea_orm::{ConnectionTrait, DbBackend, DbErr, RuntimeErr};
use serde::Serialize;
use fincafe_common::{error, info, warn};

use crate::classify::is_already_exists;
use crate::db::connection::establish_connection;
use crate::error::TenancyError;
use crate::template::ConnectionTemplate;
use crate::tenant::validate_database_name;

/// Outcome of [`DatabaseProvisioner::create_database`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Provisioned {
    Created,
    AlreadyExisted,
}

#[derive(Debug, Clone)]
pub struct DatabaseProvisioner {
    template: ConnectionTemplate,
}

impl DatabaseProvisioner {
    pub fn new(template: ConnectionTemplate) -> Self {
        Self { template }
    }

    /// Create `database_name` if it does not exist yet
    ///
    /// An existing database is success. Server backends use a short-lived
    /// control-plane connection that is closed on every path.
    pub async fn create_database(&self, database_name: &str) -> Result<Provisioned, TenancyError> {
        validate_database_name(database_name)?;

        let outcome = match self.template.backend() {
            DbBackend::Sqlite => self.create_sqlite_file(database_name).await?,
            backend => self.create_on_server(backend, database_name).await?,
        };

        match outcome {
            Provisioned::Created => info!("Created database {}", database_name),
            Provisioned::AlreadyExisted => info!("Database {} already exists", database_name),
        }
        Ok(outcome)
    }

    async fn create_on_server(
        &self,
        backend: DbBackend,
        database_name: &str,
    ) -> Result<Provisioned, TenancyError> {
        let statement = match backend {
            DbBackend::MySql => format!(
                "CREATE DATABASE `{database_name}` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci"
            ),
            _ => format!("CREATE DATABASE \"{database_name}\" WITH ENCODING 'UTF8'"),
        };

        let conn = establish_connection(self.template.base_url()).await?;
        let result = conn.execute_unprepared(&statement).await;

        if let Err(e) = conn.close().await {
            warn!("Failed to close provisioning connection: {}", e);
        }

        match result {
            Ok(_) => Ok(Provisioned::Created),
            Err(e) if is_already_exists(&e) => Ok(Provisioned::AlreadyExisted),
            Err(e) => {
                error!("Failed to create database {}: {}", database_name, e);
                Err(e.into())
            }
        }
    }

    /// A SQLite database is a file; an empty file is a valid empty database
    async fn create_sqlite_file(&self, database_name: &str) -> Result<Provisioned, TenancyError> {
        let Some(path) = self.template.sqlite_path(database_name) else {
            return Err(TenancyError::UnsupportedUrl(self.template.base_url().to_string()));
        };

        let created = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await;

        match created {
            Ok(_) => Ok(Provisioned::Created),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(Provisioned::AlreadyExisted),
            Err(e) => {
                error!("Failed to create {}: {}", path.display(), e);
                Err(DbErr::Conn(RuntimeErr::Internal(format!(
                    "cannot create database file {}: {e}",
                    path.display()
                )))
                .into())
            }
        }
    }
}
