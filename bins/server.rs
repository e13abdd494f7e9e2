use dotenvy::dotenv;
use tracing::{error, info, warn};
use uuid::Uuid;

fn main() -> std::process::ExitCode {
    dotenv().ok();

    // Worker threads and log format come from config.toml or the environment
    let cfg = configs::AppConfig::load_or_env();
    match &cfg {
        Ok(cfg) => server::startup::init_logging(cfg),
        Err(_) => common::utils::logging::init_logging_default(),
    }
    info!(service = "server", event = "logger_init", "tracing subscriber initialized");

    let service_id = Uuid::new_v4();
    let pid = std::process::id();
    let version = env!("CARGO_PKG_VERSION");

    std::panic::set_hook(Box::new({
        let service_id = service_id;
        move |info| {
            error!(
                service = "server",
                event = "panic",
                %service_id,
                pid,
                message = %info,
                "unhandled panic occurred"
            );
        }
    }));

    let worker_threads = match &cfg {
        Ok(cfg) => cfg.server.worker_threads,
        Err(e) => {
            // run() reports the config error properly; only size the runtime here
            warn!(service = "server", event = "config_invalid", error = %e, "falling back to TOKIO_WORKER_THREADS");
            std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse::<usize>().ok())
        }
    };

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads {
        builder.worker_threads(w);
    }

    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service = "server", event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return std::process::ExitCode::FAILURE;
        }
    };

    info!(
        service = "server",
        event = "start",
        %service_id,
        pid,
        version,
        threads = worker_threads.unwrap_or_default(),
        "server service starting"
    );

    // run() drains in-flight requests on Ctrl+C and returns; a second Ctrl+C
    // while draining aborts.
    rt.block_on(async move {
        let mut server_task = tokio::spawn(server::run());
        tokio::select! {
            res = &mut server_task => exit_code(res, service_id, pid),
            _ = tokio::signal::ctrl_c() => {
                info!(service = "server", event = "shutdown_signal", %service_id, pid, "received Ctrl+C, draining connections");
                tokio::select! {
                    res = &mut server_task => exit_code(res, service_id, pid),
                    _ = tokio::signal::ctrl_c() => {
                        warn!(service = "server", event = "forced_exit", %service_id, pid, "second Ctrl+C, exiting now");
                        std::process::ExitCode::FAILURE
                    }
                }
            }
        }
    })
}

fn exit_code(
    res: Result<anyhow::Result<()>, tokio::task::JoinError>,
    service_id: Uuid,
    pid: u32,
) -> std::process::ExitCode {
    match res {
        Ok(Ok(())) => {
            info!(service = "server", event = "stop", %service_id, pid, "server stopped normally");
            std::process::ExitCode::SUCCESS
        }
        Ok(Err(e)) => {
            error!(service = "server", event = "run_failed", error = %e, "server::run returned error");
            std::process::ExitCode::FAILURE
        }
        Err(e) => {
            error!(service = "server", event = "task_join_error", error = %e, "server task join error");
            std::process::ExitCode::FAILURE
        }
    }
}
