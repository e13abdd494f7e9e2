//! Persistence handle manager.
//!
//! One [`DbHandle`] lives for the whole process. The first `acquire` opens
//! the pool; later callers (including ones racing the first) get a clone of
//! the same handle.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::errors::ModelError;

/// Translate the `[database]` section into SeaORM connect options.
pub fn connect_options(cfg: &DatabaseConfig) -> ConnectOptions {
    let mut opts = ConnectOptions::new(cfg.url.clone());
    opts.max_connections(cfg.max_connections)
        .min_connections(cfg.min_connections)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    opts
}

pub struct DbHandle {
    options: ConnectOptions,
    conn: Mutex<Option<DatabaseConnection>>,
    connects: AtomicUsize,
}

impl DbHandle {
    pub fn new(options: ConnectOptions) -> Self {
        Self { options, conn: Mutex::new(None), connects: AtomicUsize::new(0) }
    }

    pub fn from_config(cfg: &DatabaseConfig) -> Self { Self::new(connect_options(cfg)) }

    /// Return the shared connection, opening it if this is the first call.
    /// The lock is held across the connect so a concurrent caller waits for
    /// the in-flight attempt instead of opening a second pool.
    pub async fn acquire(&self) -> Result<DatabaseConnection, ModelError> {
        let mut guard = self.conn.lock().await;
        if let Some(db) = guard.as_ref() {
            return Ok(db.clone());
        }
        let db = Database::connect(self.options.clone()).await?;
        self.connects.fetch_add(1, Ordering::SeqCst);
        info!(backend = ?db.get_database_backend(), "database connection established");
        *guard = Some(db.clone());
        Ok(db)
    }

    /// Close and forget the connection. Calling it twice is harmless.
    pub async fn release(&self) -> Result<(), ModelError> {
        let taken = self.conn.lock().await.take();
        if let Some(db) = taken {
            db.close().await?;
            info!("database connection released");
        }
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), ModelError> {
        let db = self.acquire().await?;
        db.ping().await.map_err(|e| {
            warn!(err = %e, "database ping failed");
            ModelError::from(e)
        })
    }

    pub async fn is_connected(&self) -> bool { self.conn.lock().await.is_some() }

    /// Number of times a connection has actually been opened.
    pub fn connect_attempts(&self) -> usize { self.connects.load(Ordering::SeqCst) }
}
