//! ---
//! applog_section: "01-core-functionality"
//! applog_subsection: "binary"
//! applog_type: "source"
//! applog_scope: "code"
//! applog_description: "Binary entrypoint for the applog daemon."
//! applog_version: "v0.0.0-prealpha"
//! applog_owner: "tbd"
//! ---
use std::sync::Arc;

use anyhow::{Context, Result};
use applog_api::{spawn_api_server, ApiState};
use applog_common::{init_tracing, AppConfig};
use applog_metrics::{new_registry, HttpMetrics};
use applog_store::LogStore;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config);

    let store = LogStore::new(&config.log_file);
    store.ensure_parent_dir().with_context(|| {
        format!(
            "failed to create log directory for {}",
            config.log_file.display()
        )
    })?;

    let registry = new_registry();
    let metrics = HttpMetrics::new(registry)?;

    let addr = config.listen_addr()?;
    let state = Arc::new(ApiState::new(&config, store, metrics));
    let server = spawn_api_server(state, addr)?;

    info!(
        address = %server.addr(),
        log_file = %config.log_file.display(),
        level = %config.log_level,
        "applogd serving"
    );

    shutdown_signal().await;
    info!("termination signal received; shutting down");
    server.shutdown().await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut term = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        term.recv().await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
