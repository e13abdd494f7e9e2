use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::{init_logging_default, init_logging_json};
use configs::{AppConfig, LogFormat};
use dotenvy::dotenv;
use migration::{Migrator, MigratorTrait};
use models::db::DbHandle;
use service::notify::Notifier;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, auth::ServerState};

/// Install the tracing subscriber in the configured format. A second call is
/// a no-op.
pub fn init_logging(cfg: &AppConfig) {
    match cfg.logging.format {
        LogFormat::Json => init_logging_json(),
        LogFormat::Compact => init_logging_default(),
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(err = %e, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

/// Wire configuration, database, mail and routes into a ready router.
pub async fn build_app(cfg: &AppConfig) -> Result<(Router, Arc<DbHandle>), StartupError> {
    let db_handle = Arc::new(DbHandle::from_config(&cfg.database));
    let db = db_handle.acquire().await.map_err(|e| StartupError::Database(e.to_string()))?;
    Migrator::up(&db, None).await.map_err(|e| StartupError::Database(e.to_string()))?;

    let notifier = Notifier::from_config(&cfg.mail).map_err(|e| StartupError::Mail(e.to_string()))?;
    let state = ServerState::new(Arc::clone(&db_handle), db, &cfg.auth, notifier);
    Ok((routes::build_router(state, build_cors()), db_handle))
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;
    init_logging(&cfg);

    let (app, db_handle) = build_app(&cfg).await?;

    let addr = bind_addr(&cfg)?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, mail_active = cfg.mail.is_active(), "http server listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    db_handle.release().await.map_err(|e| StartupError::Database(e.to_string()))?;
    info!("http server stopped");
    Ok(())
}
