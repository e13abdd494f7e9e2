//! Create `blogs` table.
//!
//! Content sections are stored as a JSON array.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Blogs::Table)
                    .if_not_exists()
                    .col(uuid(Blogs::Id).primary_key())
                    .col(string_len(Blogs::Title, 200))
                    .col(string_len(Blogs::Slug, 200))
                    .col(text_null(Blogs::Excerpt))
                    .col(json(Blogs::Sections))
                    .col(string_len(Blogs::Status, 16))
                    .col(uuid(Blogs::AuthorId))
                    .col(timestamp_with_time_zone_null(Blogs::PublishedAt))
                    .col(timestamp_with_time_zone(Blogs::CreatedAt))
                    .col(timestamp_with_time_zone(Blogs::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Blogs::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Blogs { Table, Id, Title, Slug, Excerpt, Sections, Status, AuthorId, PublishedAt, CreatedAt, UpdatedAt }
