use std::sync::Arc;

use anyhow::Result;
use sea_orm::{ConnectionTrait, DatabaseBackend, Statement};

use super::memory_options;
use crate::db::DbHandle;

#[tokio::test]
async fn acquire_is_memoised() -> Result<()> {
    let handle = DbHandle::new(memory_options());
    assert!(!handle.is_connected().await);

    let first = handle.acquire().await?;
    let second = handle.acquire().await?;
    assert_eq!(handle.connect_attempts(), 1);

    // both clones talk to the same in-memory database
    first
        .execute(Statement::from_string(DatabaseBackend::Sqlite, "CREATE TABLE probe (id INTEGER)"))
        .await?;
    second
        .execute(Statement::from_string(DatabaseBackend::Sqlite, "INSERT INTO probe (id) VALUES (1)"))
        .await?;
    Ok(())
}

#[tokio::test]
async fn concurrent_acquire_opens_one_connection() -> Result<()> {
    let handle = Arc::new(DbHandle::new(memory_options()));
    let mut tasks = Vec::new();
    for _ in 0..8 {
        let h = Arc::clone(&handle);
        tasks.push(tokio::spawn(async move { h.acquire().await.map(|_| ()) }));
    }
    for t in tasks {
        t.await??;
    }
    assert_eq!(handle.connect_attempts(), 1);
    Ok(())
}

#[tokio::test]
async fn release_is_idempotent_and_reacquire_reconnects() -> Result<()> {
    let handle = DbHandle::new(memory_options());
    handle.acquire().await?;
    handle.release().await?;
    handle.release().await?;
    assert!(!handle.is_connected().await);

    handle.acquire().await?;
    assert_eq!(handle.connect_attempts(), 2);
    Ok(())
}

#[tokio::test]
async fn health_check_connects_lazily() -> Result<()> {
    let handle = DbHandle::new(memory_options());
    handle.health_check().await?;
    assert!(handle.is_connected().await);
    Ok(())
}
