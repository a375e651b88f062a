//! Database connection management

use std::time::Duration;

use fincafe_common::{debug, error, info};
use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseConnection, DbErr};

use crate::template::redact_url;

/// Establish SeaORM database connection
pub async fn establish_connection(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    info!("Connecting to {} with SeaORM...", redact_url(database_url));

    let orm_conn = SeaOrmDatabase::connect(database_url).await.map_err(|e| {
        error!("Failed to create SeaORM connection: {}", e);
        e
    })?;

    debug!("Successfully connected to {}", redact_url(database_url));

    Ok(orm_conn)
}

/// Build a pool that does not touch the server until a query runs
pub async fn establish_lazy_connection(
    database_url: &str,
    acquire_timeout: Duration,
) -> Result<DatabaseConnection, DbErr> {
    let mut options = ConnectOptions::new(database_url.to_owned());
    options
        .connect_lazy(true)
        .acquire_timeout(acquire_timeout)
        .sqlx_logging(false);

    SeaOrmDatabase::connect(options).await
}
