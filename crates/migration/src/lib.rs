//! Migrator registering one migration per table; unique and lookup indexes
//! are applied last.
pub use sea_orm_migration::prelude::*;

mod m20240301_000001_create_users;
mod m20240301_000002_create_services;
mod m20240301_000003_create_sub_services;
mod m20240301_000004_create_bookings;
mod m20240301_000005_create_contacts;
mod m20240301_000006_create_blogs;
mod m20240301_000010_add_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_users::Migration),
            Box::new(m20240301_000002_create_services::Migration),
            Box::new(m20240301_000003_create_sub_services::Migration),
            Box::new(m20240301_000004_create_bookings::Migration),
            Box::new(m20240301_000005_create_contacts::Migration),
            Box::new(m20240301_000006_create_blogs::Migration),
            // Indexes should always be applied last
            Box::new(m20240301_000010_add_indexes::Migration),
        ]
    }
}
