//! Error types for tenancy operations

use sea_orm::DbErr;
use thiserror::Error;

use crate::classify::{classify_db_error, FailureClass};
use crate::migrator::MigrationError;

#[derive(Error, Debug)]
pub enum TenancyError {
    #[error("Invalid farm code '{0}': only lowercase letters, numbers and hyphens are allowed")]
    InvalidCode(String),

    #[error("Invalid database name '{0}': only lowercase letters, numbers and underscores are allowed")]
    InvalidDatabaseName(String),

    #[error("Unsupported database URL: {0}")]
    UnsupportedUrl(String),

    #[error("Farm '{0}' not found")]
    FarmNotFound(String),

    #[error("Farm '{0}' is not active")]
    FarmInactive(String),

    #[error("Farm '{0}' is already registered")]
    FarmExists(String),

    /// The tenant database or its schema is missing; initialization will fix it
    #[error("Database '{database}' is not initialized. Please run initialization first")]
    NotProvisioned {
        database: String,
        #[source]
        source: DbErr,
    },

    #[error("Schema migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl TenancyError {
    /// Wrap a failure from a tenant database, recognising missing databases and schemas
    pub fn from_tenant_query(database: &str, err: DbErr) -> Self {
        match classify_db_error(&err) {
            FailureClass::NotProvisioned => TenancyError::NotProvisioned {
                database: database.to_string(),
                source: err,
            },
            FailureClass::Other => TenancyError::Database(err),
        }
    }

    pub fn is_not_provisioned(&self) -> bool {
        matches!(self, TenancyError::NotProvisioned { .. })
    }
}

/// Attach the tenant database to a query result
pub trait TenantQueryExt<T> {
    fn for_tenant(self, database: &str) -> Result<T, TenancyError>;
}

impl<T> TenantQueryExt<T> for Result<T, DbErr> {
    fn for_tenant(self, database: &str) -> Result<T, TenancyError> {
        self.map_err(|err| TenancyError::from_tenant_query(database, err))
    }
}
