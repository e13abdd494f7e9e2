//! Create `bookings` table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Bookings::Table)
                    .if_not_exists()
                    .col(uuid(Bookings::Id).primary_key())
                    .col(string_len(Bookings::BookingId, 40))
                    .col(string_len(Bookings::FullName, 128))
                    .col(string_len(Bookings::Email, 255))
                    .col(string_len(Bookings::Phone, 32))
                    .col(string_len_null(Bookings::FromAddress, 500))
                    .col(string_len_null(Bookings::ToAddress, 500))
                    .col(date_null(Bookings::MoveDate))
                    .col(uuid(Bookings::ServiceId))
                    .col(string_len(Bookings::ServiceName, 120))
                    .col(uuid_null(Bookings::SubServiceId))
                    .col(string_len_null(Bookings::SubServiceName, 120))
                    .col(double_null(Bookings::SubServicePrice))
                    .col(text(Bookings::Notes))
                    .col(string_len(Bookings::Status, 16))
                    .col(timestamp_with_time_zone(Bookings::SubmittedAt))
                    .col(timestamp_with_time_zone(Bookings::UpdatedAt))
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(Bookings::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
pub(crate) enum Bookings {
    Table,
    Id,
    BookingId,
    FullName,
    Email,
    Phone,
    FromAddress,
    ToAddress,
    MoveDate,
    ServiceId,
    ServiceName,
    SubServiceId,
    SubServiceName,
    SubServicePrice,
    Notes,
    Status,
    SubmittedAt,
    UpdatedAt,
}
