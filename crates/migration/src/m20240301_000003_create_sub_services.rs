//! Create `sub_services` table.
//!
//! The parent is referenced by id only; there is no foreign key, children are
//! removed explicitly before their Service.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SubServices::Table)
                    .if_not_exists()
                    .col(uuid(SubServices::Id).primary_key())
                    .col(uuid(SubServices::ServiceId))
                    .col(string_len(SubServices::Name, 120))
                    .col(text_null(SubServices::Description))
                    .col(double(SubServices::Price))
                    .col(string_len(SubServices::PriceType, 16))
                    .col(boolean(SubServices::IsActive))
                    .col(timestamp_with_time_zone(SubServices::CreatedAt))
                    .col(timestamp_with_time_zone(SubServices::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(SubServices::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum SubServices { Table, Id, ServiceId, Name, Description, Price, PriceType, IsActive, CreatedAt, UpdatedAt }
