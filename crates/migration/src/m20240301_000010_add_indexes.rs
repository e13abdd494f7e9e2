use sea_orm_migration::prelude::*;

use crate::m20240301_000001_create_users::Users;
use crate::m20240301_000002_create_services::Services;
use crate::m20240301_000003_create_sub_services::SubServices;
use crate::m20240301_000004_create_bookings::Bookings;
use crate::m20240301_000006_create_blogs::Blogs;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Uniqueness the service layer relies on for conflict detection
        manager
            .create_index(
                Index::create()
                    .name("idx_users_email_unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_services_title_unique")
                    .table(Services::Table)
                    .col(Services::Title)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_booking_id_unique")
                    .table(Bookings::Table)
                    .col(Bookings::BookingId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blogs_slug_unique")
                    .table(Blogs::Table)
                    .col(Blogs::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Lookups
        manager
            .create_index(
                Index::create()
                    .name("idx_sub_services_service")
                    .table(SubServices::Table)
                    .col(SubServices::ServiceId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_status")
                    .table(Bookings::Table)
                    .col(Bookings::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_bookings_submitted_at")
                    .table(Bookings::Table)
                    .col(Bookings::SubmittedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_index(Index::drop().name("idx_bookings_submitted_at").table(Bookings::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_bookings_status").table(Bookings::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_sub_services_service").table(SubServices::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_blogs_slug_unique").table(Blogs::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_bookings_booking_id_unique").table(Bookings::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_services_title_unique").table(Services::Table).to_owned()).await?;
        manager.drop_index(Index::drop().name("idx_users_email_unique").table(Users::Table).to_owned()).await
    }
}
