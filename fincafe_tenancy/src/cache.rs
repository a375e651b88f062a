//! Process-wide cache of tenant database handles
//!
//! One handle per database name for the life of the cache. Handles are created
//! lazily: obtaining one never fails because the database is missing, the first
//! query does.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::OnceCell;
use fincafe_common::{debug, info, warn};

use crate::db::Database;
use crate::error::TenancyError;
use crate::template::ConnectionTemplate;
use crate::tenant::validate_database_name;

#[derive(Debug)]
pub struct ConnectionCache {
    template: ConnectionTemplate,
    acquire_timeout: Duration,
    handles: DashMap<String, Arc<OnceCell<Database>>>,
}

impl ConnectionCache {
    pub fn new(template: ConnectionTemplate, acquire_timeout: Duration) -> Self {
        Self {
            template,
            acquire_timeout,
            handles: DashMap::new(),
        }
    }

    pub fn template(&self) -> &ConnectionTemplate {
        &self.template
    }

    /// Handle for `database_name`, created on first request
    ///
    /// Concurrent first requests for the same name wait on a single construction and
    /// all receive the same handle.
    pub async fn get_connection(&self, database_name: &str) -> Result<Database, TenancyError> {
        validate_database_name(database_name)?;

        let cell = self
            .handles
            .entry(database_name.to_string())
            .or_default()
            .clone();

        let db = cell
            .get_or_try_init(|| async {
                debug!("Opening connection pool for {}", database_name);
                Database::lazy(
                    database_name,
                    &self.template.tenant_url(database_name),
                    self.acquire_timeout,
                )
                .await
            })
            .await?;

        Ok(db.clone())
    }

    /// Number of cached handles
    pub fn len(&self) -> usize {
        self.handles
            .iter()
            .filter(|entry| entry.value().initialized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, database_name: &str) -> bool {
        self.handles
            .get(database_name)
            .is_some_and(|cell| cell.initialized())
    }

    /// Close every cached handle and empty the cache
    ///
    /// Failures to close one handle are logged and do not stop the others.
    pub async fn close_all(&self) -> usize {
        let names: Vec<String> = self.handles.iter().map(|entry| entry.key().clone()).collect();

        let mut closed = 0;
        for name in names {
            let Some((_, cell)) = self.handles.remove(&name) else {
                continue;
            };
            let Some(db) = cell.get() else {
                continue;
            };

            match db.close().await {
                Ok(()) => closed += 1,
                Err(e) => warn!("Failed to close connection to {}: {}", name, e),
            }
        }

        if closed > 0 {
            info!("Closed {} tenant connection(s)", closed);
        }
        closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> ConnectionCache {
        ConnectionCache::new(
            ConnectionTemplate::parse("sqlite:///tmp/fincafe-cache-test/control.db").unwrap(),
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_same_name_same_handle() {
        let cache = cache();
        let a = cache.get_connection("customer_a").await.unwrap();
        let b = cache.get_connection("customer_a").await.unwrap();
        let c = cache.get_connection("customer_b").await.unwrap();

        assert!(a.same_connection(&b));
        assert!(!a.same_connection(&c));
        assert_eq!(cache.len(), 2);
        assert!(cache.contains("customer_a"));
    }

    #[tokio::test]
    async fn test_rejects_invalid_names() {
        let cache = cache();
        let err = cache.get_connection("customer;drop").await.unwrap_err();
        assert!(matches!(err, TenancyError::InvalidDatabaseName(_)));
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_close_all_empties_cache() {
        let cache = cache();
        let first = cache.get_connection("customer_a").await.unwrap();
        cache.get_connection("customer_b").await.unwrap();

        assert_eq!(cache.close_all().await, 2);
        assert!(cache.is_empty());
        assert_eq!(cache.close_all().await, 0);

        let reopened = cache.get_connection("customer_a").await.unwrap();
        assert!(!first.same_connection(&reopened));
    }
}
