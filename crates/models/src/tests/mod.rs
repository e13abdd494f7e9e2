//! Persistence tests against an in-memory SQLite database built by the
//! migrator.

/// Persistence handle lifecycle
pub mod db_tests;

/// Entity round trips and index enforcement
pub mod crud_tests;

use migration::MigratorTrait;
use sea_orm::{ConnectOptions, DatabaseConnection};

use crate::db::DbHandle;

pub(crate) fn memory_options() -> ConnectOptions {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    // every pooled connection would otherwise see its own empty database
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    opts
}

pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let handle = DbHandle::new(memory_options());
    let db = handle.acquire().await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}
