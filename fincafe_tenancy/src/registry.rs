//! Control-plane registry of farms

use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    SqlErr,
};
use fincafe_common::info;

use crate::db::entities::farms;
use crate::db::Database;
use crate::error::TenancyError;
use crate::tenant::{database_name_for, validate_code, Tenant};

#[derive(Debug, Clone)]
pub struct FarmRegistry {
    db: Database,
    tenant_db_prefix: String,
}

impl FarmRegistry {
    pub fn new(db: Database, tenant_db_prefix: &str) -> Self {
        Self {
            db,
            tenant_db_prefix: tenant_db_prefix.to_string(),
        }
    }

    /// Connect to the control plane and bring its schema up to date
    pub async fn connect(database_url: &str, tenant_db_prefix: &str) -> Result<Self, TenancyError> {
        let db = Database::new("control_plane", database_url).await?;
        Migrator::up(db.orm(), None).await?;
        Ok(Self::new(db, tenant_db_prefix))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<Tenant>, TenancyError> {
        let farm = farms::Entity::find()
            .filter(farms::Column::Code.eq(code))
            .one(self.db.orm())
            .await?;
        Ok(farm.map(Tenant::from))
    }

    /// Look up a farm that must exist and be active
    pub async fn resolve_active(&self, code: &str) -> Result<Tenant, TenancyError> {
        validate_code(code)?;
        let tenant = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| TenancyError::FarmNotFound(code.to_string()))?;
        if !tenant.is_active {
            return Err(TenancyError::FarmInactive(code.to_string()));
        }
        Ok(tenant)
    }

    pub async fn list_active(&self) -> Result<Vec<Tenant>, TenancyError> {
        let farms = farms::Entity::find()
            .filter(farms::Column::IsActive.eq(true))
            .order_by_asc(farms::Column::Code)
            .all(self.db.orm())
            .await?;
        Ok(farms.into_iter().map(Tenant::from).collect())
    }

    /// Register a new farm; its database name is derived from the code
    pub async fn register(
        &self,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Tenant, TenancyError> {
        let database_name = database_name_for(&self.tenant_db_prefix, code)?;

        let farm = farms::ActiveModel {
            name: Set(name.to_string()),
            code: Set(code.to_string()),
            database_name: Set(database_name),
            description: Set(description.map(str::to_string)),
            ..farms::ActiveModel::new()
        };

        let farm = farm.insert(self.db.orm()).await.map_err(|e| {
            match e.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => {
                    TenancyError::FarmExists(code.to_string())
                }
                _ => TenancyError::Database(e),
            }
        })?;

        info!("Registered farm {} ({})", farm.code, farm.database_name);
        Ok(farm.into())
    }

    /// Find a farm by code, registering it when absent
    pub async fn ensure_registered(
        &self,
        code: &str,
        name: &str,
        description: Option<&str>,
    ) -> Result<Tenant, TenancyError> {
        validate_code(code)?;
        if let Some(tenant) = self.find_by_code(code).await? {
            return Ok(tenant);
        }
        match self.register(code, name, description).await {
            Err(TenancyError::FarmExists(_)) => self
                .find_by_code(code)
                .await?
                .ok_or_else(|| TenancyError::FarmNotFound(code.to_string())),
            other => other,
        }
    }

    pub async fn set_active(&self, code: &str, is_active: bool) -> Result<Tenant, TenancyError> {
        let farm = farms::Entity::find()
            .filter(farms::Column::Code.eq(code))
            .one(self.db.orm())
            .await?
            .ok_or_else(|| TenancyError::FarmNotFound(code.to_string()))?;

        let mut farm: farms::ActiveModel = farm.into();
        farm.is_active = Set(is_active);
        let farm = farm.update(self.db.orm()).await?;
        Ok(farm.into())
    }
}
