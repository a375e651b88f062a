use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Plots::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Plots::Id)
                            .char_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Plots::Name).string_len(255).not_null())
                    .col(ColumnDef::new(Plots::AreaHectares).double().null())
                    // GeoJSON polygon drawn on the map
                    .col(ColumnDef::new(Plots::Boundary).json().null())
                    .col(ColumnDef::new(Plots::CropTypeId).char_len(36).null())
                    .col(
                        ColumnDef::new(Plots::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Plots::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_plots_crop_type_id")
                            .from(Plots::Table, Plots::CropTypeId)
                            .to(CropTypes::Table, CropTypes::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Plots::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Plots {
    Table,
    Id,
    Name,
    AreaHectares,
    Boundary,
    CropTypeId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum CropTypes {
    Table,
    Id,
}
