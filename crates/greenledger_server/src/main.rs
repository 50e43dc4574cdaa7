//! Green Ledger API server entry point.
//!
//! # Responsibility
//! - Resolve configuration, initialize logging and open the entry store.
//! - Serve the HTTP API until Ctrl-C or SIGTERM.

mod config;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use config::ServerConfig;
use greenledger_api::{serve, AppState};
use greenledger_core::db::{open_db, open_db_in_memory};
use greenledger_core::init_logging;
use log::info;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    let config = ServerConfig::parse();

    init_logging(&config.log_level, config.log_dir.as_deref())
        .map_err(|err| anyhow!("logging init failed: {err}"))?;

    let conn = if config.in_memory {
        open_db_in_memory().context("failed to open in-memory database")?
    } else {
        open_db(&config.db_path).with_context(|| {
            format!("failed to open database `{}`", config.db_path.display())
        })?
    };

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    serve(listener, AppState::new(conn), shutdown_signal())
        .await
        .context("server terminated with an error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            log::error!("event=shutdown_signal module=server status=error error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                log::error!("event=shutdown_signal module=server status=error error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("event=shutdown_signal module=server status=ok");
}
