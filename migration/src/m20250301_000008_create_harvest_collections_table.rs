//! Per-picker harvest records

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(HarvestCollections::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(HarvestCollections::Id)
                            .char_len(36)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::PlotId)
                            .char_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::CropTypeId)
                            .char_len(36)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::PickerName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::Kilograms)
                            .double()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::CollectionDate)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(HarvestCollections::Notes).text().null())
                    .col(
                        ColumnDef::new(HarvestCollections::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(HarvestCollections::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_harvest_collections_plot_id")
                            .from(HarvestCollections::Table, HarvestCollections::PlotId)
                            .to(Plots::Table, Plots::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_harvest_collections_crop_type_id")
                            .from(HarvestCollections::Table, HarvestCollections::CropTypeId)
                            .to(CropTypes::Table, CropTypes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_harvest_collections_plot_id")
                    .table(HarvestCollections::Table)
                    .col(HarvestCollections::PlotId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_harvest_collections_collection_date")
                    .table(HarvestCollections::Table)
                    .col(HarvestCollections::CollectionDate)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HarvestCollections::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum HarvestCollections {
    Table,
    Id,
    PlotId,
    CropTypeId,
    PickerName,
    Kilograms,
    CollectionDate,
    Notes,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Plots {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum CropTypes {
    Table,
    Id,
}
