//! SeaORM entities for the control plane and the tenant schema

pub mod crop_types;
pub mod farms;
pub mod permissions;
pub mod role_permissions;
pub mod roles;
pub mod users;

// Re-exports for convenience
pub use crop_types::{
    ActiveModel as CropTypeActiveModel, Column as CropTypeColumn, Entity as CropTypes,
    Model as CropTypeModel,
};
pub use farms::{
    ActiveModel as FarmActiveModel, Column as FarmColumn, Entity as Farms, Model as FarmModel,
};
pub use permissions::{
    ActiveModel as PermissionActiveModel, Column as PermissionColumn, Entity as Permissions,
    Model as PermissionModel,
};
pub use role_permissions::{
    ActiveModel as RolePermissionActiveModel, Column as RolePermissionColumn,
    Entity as RolePermissions, Model as RolePermissionModel,
};
pub use roles::{
    ActiveModel as RoleActiveModel, Column as RoleColumn, Entity as Roles, Model as RoleModel,
};
pub use users::{
    ActiveModel as UserActiveModel, Column as UserColumn, Entity as Users, Model as UserModel,
};

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::sea_query::StringLen;
    use sea_orm::{ColumnTrait, ColumnType};

    fn column_type<C: ColumnTrait>(column: C) -> ColumnType {
        column.def().get_column_type().clone()
    }

    #[test]
    fn test_name_columns_match_migrated_lengths() {
        let string = |n| ColumnType::String(StringLen::N(n));

        assert_eq!(column_type(PermissionColumn::Name), string(100));
        assert_eq!(column_type(PermissionColumn::Resource), string(50));
        assert_eq!(column_type(PermissionColumn::Action), string(50));
        assert_eq!(column_type(RoleColumn::Name), string(100));
        assert_eq!(column_type(CropTypeColumn::Name), string(100));
        assert_eq!(column_type(FarmColumn::Code), string(100));
        assert_eq!(column_type(FarmColumn::DatabaseName), string(128));
        assert_eq!(column_type(UserColumn::Email), string(255));
        assert_eq!(column_type(PermissionColumn::Description), ColumnType::Text);
    }
}
