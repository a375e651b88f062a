//! Default data every farm database starts with
//!
//! Seeding is additive and idempotent: records are matched by their unique name, and
//! missing role/permission links are added without removing links an operator created.

use std::collections::HashSet;
use std::sync::Arc;

use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, Set, SqlErr,
};
use serde::Serialize;
use fincafe_common::{debug, info};

use crate::cache::ConnectionCache;
use crate::db::entities::{crop_types, permissions, role_permissions, roles};
use crate::error::{TenancyError, TenantQueryExt};

struct PermissionSeed {
    name: &'static str,
    resource: &'static str,
    action: &'static str,
    description: &'static str,
}

const PERMISSIONS: [PermissionSeed; 10] = [
    PermissionSeed {
        name: "users.create",
        resource: "users",
        action: "create",
        description: "Create new users",
    },
    PermissionSeed {
        name: "users.read",
        resource: "users",
        action: "read",
        description: "View users",
    },
    PermissionSeed {
        name: "users.update",
        resource: "users",
        action: "update",
        description: "Update users",
    },
    PermissionSeed {
        name: "users.delete",
        resource: "users",
        action: "delete",
        description: "Delete users",
    },
    PermissionSeed {
        name: "roles.create",
        resource: "roles",
        action: "create",
        description: "Create new roles",
    },
    PermissionSeed {
        name: "roles.read",
        resource: "roles",
        action: "read",
        description: "View roles",
    },
    PermissionSeed {
        name: "roles.update",
        resource: "roles",
        action: "update",
        description: "Update roles",
    },
    PermissionSeed {
        name: "roles.delete",
        resource: "roles",
        action: "delete",
        description: "Delete roles",
    },
    PermissionSeed {
        name: "permissions.read",
        resource: "permissions",
        action: "read",
        description: "View permissions",
    },
    PermissionSeed {
        name: "permissions.manage",
        resource: "permissions",
        action: "manage",
        description: "Manage permissions",
    },
];

/// Which permissions a default role receives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Grant {
    Everything,
    /// Any `users.*` permission plus every read permission
    UserManagement,
    /// `users.read` and `users.update`
    OwnUsers,
    ReadOnly,
}

impl Grant {
    fn includes(self, permission: &permissions::Model) -> bool {
        let resource = permission.resource.as_str();
        let action = permission.action.as_str();
        match self {
            Grant::Everything => true,
            Grant::UserManagement => resource == "users" || action == "read",
            Grant::OwnUsers => resource == "users" && matches!(action, "read" | "update"),
            Grant::ReadOnly => action == "read",
        }
    }
}

struct RoleSeed {
    name: &'static str,
    description: &'static str,
    grant: Grant,
}

const ROLES: [RoleSeed; 4] = [
    RoleSeed {
        name: "admin",
        description: "Administrator with full access",
        grant: Grant::Everything,
    },
    RoleSeed {
        name: "manager",
        description: "Manager with user management access",
        grant: Grant::UserManagement,
    },
    RoleSeed {
        name: "employee",
        description: "Employee with limited access",
        grant: Grant::OwnUsers,
    },
    RoleSeed {
        name: "viewer",
        description: "Viewer with read-only access",
        grant: Grant::ReadOnly,
    },
];

const DEFAULT_CROP_TYPE: &str = "Coffee";
const DEFAULT_CROP_TYPE_DESCRIPTION: &str = "Coffee crop (default)";

/// Row counts read back from the tenant database after a seeding run
///
/// Counts cover whole tables, so records an operator added are included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub permissions: u64,
    pub roles: u64,
    pub role_permissions: u64,
    /// Role/permission links inserted by this run
    pub links_added: usize,
    pub crop_types: u64,
}

#[derive(Debug, Clone)]
pub struct Seeder {
    cache: Arc<ConnectionCache>,
}

impl Seeder {
    pub fn new(cache: Arc<ConnectionCache>) -> Self {
        Self { cache }
    }

    /// Ensure default permissions, roles, role grants and crop type exist
    pub async fn seed(&self, database_name: &str) -> Result<SeedSummary, TenancyError> {
        let db = self.cache.get_connection(database_name).await?;
        let summary = seed_defaults(db.orm()).await.for_tenant(database_name)?;

        info!(
            "Seeded {}: {} permissions, {} roles, {} new role grants, {} crop types",
            database_name,
            summary.permissions,
            summary.roles,
            summary.links_added,
            summary.crop_types
        );
        Ok(summary)
    }
}

/// Seed default data over any connection
pub async fn seed_defaults<C>(db: &C) -> Result<SeedSummary, DbErr>
where
    C: ConnectionTrait,
{
    let mut permissions = Vec::with_capacity(PERMISSIONS.len());
    for seed in &PERMISSIONS {
        let active = permissions::ActiveModel {
            name: Set(seed.name.to_string()),
            resource: Set(seed.resource.to_string()),
            action: Set(seed.action.to_string()),
            description: Set(Some(seed.description.to_string())),
            ..permissions::ActiveModel::new()
        };
        permissions.push(find_or_insert(db, permissions::Column::Name, seed.name, active).await?);
    }

    let mut links_added = 0;
    for seed in &ROLES {
        let active = roles::ActiveModel {
            name: Set(seed.name.to_string()),
            description: Set(Some(seed.description.to_string())),
            ..roles::ActiveModel::new()
        };
        let role = find_or_insert(db, roles::Column::Name, seed.name, active).await?;

        let granted: Vec<&permissions::Model> = permissions
            .iter()
            .filter(|p| seed.grant.includes(p))
            .collect();
        links_added += grant_missing(db, &role, &granted).await?;
    }

    let crop = crop_types::ActiveModel {
        name: Set(DEFAULT_CROP_TYPE.to_string()),
        description: Set(Some(DEFAULT_CROP_TYPE_DESCRIPTION.to_string())),
        ..crop_types::ActiveModel::new()
    };
    find_or_insert(db, crop_types::Column::Name, DEFAULT_CROP_TYPE, crop).await?;

    Ok(SeedSummary {
        permissions: permissions::Entity::find().count(db).await?,
        roles: roles::Entity::find().count(db).await?,
        role_permissions: role_permissions::Entity::find().count(db).await?,
        links_added,
        crop_types: crop_types::Entity::find().count(db).await?,
    })
}

/// Look a record up by its unique name, inserting `active` when absent
///
/// A concurrent insert of the same name surfaces as a unique violation and is
/// resolved by reading the winner's row.
async fn find_or_insert<C, E, A>(
    db: &C,
    name_column: E::Column,
    name: &str,
    active: A,
) -> Result<E::Model, DbErr>
where
    C: ConnectionTrait,
    E: EntityTrait,
    E::Model: IntoActiveModel<A>,
    A: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send + 'static,
{
    if let Some(existing) = E::find().filter(name_column.eq(name)).one(db).await? {
        return Ok(existing);
    }

    match active.insert(db).await {
        Ok(model) => {
            debug!("Inserted default record '{}'", name);
            Ok(model)
        }
        Err(err) if matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            E::find()
                .filter(name_column.eq(name))
                .one(db)
                .await?
                .ok_or(err)
        }
        Err(err) => Err(err),
    }
}

/// Link `role` to every permission in `granted` it is not linked to yet
async fn grant_missing<C>(
    db: &C,
    role: &roles::Model,
    granted: &[&permissions::Model],
) -> Result<usize, DbErr>
where
    C: ConnectionTrait,
{
    let existing: HashSet<String> = role_permissions::Entity::find()
        .filter(role_permissions::Column::RoleId.eq(role.id.as_str()))
        .all(db)
        .await?
        .into_iter()
        .map(|link| link.permission_id)
        .collect();

    let missing: Vec<role_permissions::ActiveModel> = granted
        .iter()
        .filter(|p| !existing.contains(&p.id))
        .map(|p| role_permissions::ActiveModel {
            role_id: Set(role.id.clone()),
            permission_id: Set(p.id.clone()),
        })
        .collect();

    let added = missing.len();
    if added > 0 {
        role_permissions::Entity::insert_many(missing)
            .exec_without_returning(db)
            .await?;
        debug!("Granted {} permission(s) to role '{}'", added, role.name);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn permission(name: &str) -> permissions::Model {
        let (resource, action) = name.split_once('.').unwrap();
        let now = crate::db::utc_now();
        permissions::Model {
            id: name.to_string(),
            name: name.to_string(),
            description: None,
            resource: resource.to_string(),
            action: action.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn granted(grant: Grant) -> Vec<&'static str> {
        PERMISSIONS
            .iter()
            .filter(|seed| grant.includes(&permission(seed.name)))
            .map(|seed| seed.name)
            .collect()
    }

    #[test]
    fn test_default_grants() {
        assert_eq!(granted(Grant::Everything).len(), 10);
        assert_eq!(
            granted(Grant::UserManagement),
            vec![
                "users.create",
                "users.read",
                "users.update",
                "users.delete",
                "roles.read",
                "permissions.read"
            ]
        );
        assert_eq!(granted(Grant::OwnUsers), vec!["users.read", "users.update"]);
        assert_eq!(
            granted(Grant::ReadOnly),
            vec!["users.read", "roles.read", "permissions.read"]
        );
    }

    #[test]
    fn test_permission_names_match_resource_and_action() {
        for seed in &PERMISSIONS {
            assert_eq!(seed.name, format!("{}.{}", seed.resource, seed.action));
        }
    }

    #[test]
    fn test_permission_descriptions() {
        let description = |name: &str| {
            PERMISSIONS
                .iter()
                .find(|seed| seed.name == name)
                .map(|seed| seed.description)
                .unwrap()
        };
        assert_eq!(description("users.update"), "Update users");
        assert_eq!(description("permissions.manage"), "Manage permissions");
        assert_eq!(description("roles.update"), "Update roles");
    }
}
