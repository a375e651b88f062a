//! Database handles for the control plane and tenant databases

pub mod connection;
pub mod entities;

use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use std::time::Duration;

/// Database connection wrapper
///
/// Clones share the same underlying pool; two handles refer to the same
/// connection exactly when [`Database::same_connection`] holds.
#[derive(Debug, Clone)]
pub struct Database {
    /// Logical database name (tenant database or control plane)
    pub name: String,
    /// SeaORM database connection
    pub orm_conn: Arc<DatabaseConnection>,
}

impl Database {
    /// Connect eagerly, failing if the database cannot be reached
    pub async fn new(name: &str, database_url: &str) -> Result<Self, DbErr> {
        let orm_conn = connection::establish_connection(database_url).await?;
        Ok(Self::from_connection(name, orm_conn))
    }

    /// Build a handle whose pool opens connections on first use
    pub async fn lazy(
        name: &str,
        database_url: &str,
        acquire_timeout: Duration,
    ) -> Result<Self, DbErr> {
        let orm_conn = connection::establish_lazy_connection(database_url, acquire_timeout).await?;
        Ok(Self::from_connection(name, orm_conn))
    }

    pub fn from_connection(name: &str, orm_conn: DatabaseConnection) -> Self {
        Self {
            name: name.to_string(),
            orm_conn: Arc::new(orm_conn),
        }
    }

    /// Get the SeaORM connection
    pub fn orm(&self) -> &DatabaseConnection {
        &self.orm_conn
    }

    pub fn same_connection(&self, other: &Database) -> bool {
        Arc::ptr_eq(&self.orm_conn, &other.orm_conn)
    }

    /// Close the underlying pool; other clones become unusable
    pub async fn close(&self) -> Result<(), DbErr> {
        self.orm_conn.as_ref().clone().close().await
    }
}

pub(crate) fn utc_now() -> DateTimeWithTimeZone {
    chrono::Utc::now().fixed_offset()
}
