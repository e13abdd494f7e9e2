//! Create `contacts` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Contacts::Table)
                    .if_not_exists()
                    .col(uuid(Contacts::Id).primary_key())
                    .col(string_len(Contacts::Fullname, 128))
                    .col(string_len(Contacts::Email, 255))
                    .col(string_len(Contacts::Phone, 32))
                    .col(text(Contacts::Message))
                    .col(string_len(Contacts::ServiceRequired, 32))
                    .col(timestamp_with_time_zone(Contacts::CreatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Contacts::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Contacts { Table, Id, Fullname, Email, Phone, Message, ServiceRequired, CreatedAt }
