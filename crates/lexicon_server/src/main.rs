//! Lexicon HTTP server entry point.

use anyhow::Context;
use lexicon_core::db::open_db;
use lexicon_core::{init_logging, LogTarget};
use lexicon_server::{build_router, AppState, ServerConfig};
use log::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env()?;

    let target = LogTarget::from_dir(config.log_dir.as_deref()).map_err(anyhow::Error::msg)?;
    init_logging(&config.log_level, target).map_err(anyhow::Error::msg)?;

    if config.api_key.is_none() {
        warn!("event=server_start module=server status=degraded reason=api_key_not_set");
    }

    let conn = open_db(&config.db_path)
        .with_context(|| format!("failed to open database `{}`", config.db_path.display()))?;
    let bind_addr = config.bind_addr;
    let app = build_router(AppState::new(conn, config));

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;
    info!(
        "event=server_start module=server status=ok addr={} version={}",
        bind_addr,
        lexicon_core::core_version()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("event=server_stop module=server status=ok");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("event=server_stop module=server status=error error={err}");
    }
}
