//! forge-confd: runtime-managed nginx routes and promtail log sources.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌──────────────────────────────────────────────────────┐
//!   REST call     │  admin handlers ──▶ Manager<Route> ──────────────┐   │
//!  ──────────────▶│        │                                         │   │
//!                 │        └────────▶ Manager<LogSource> ──────┐     │   │
//!                 │                                            ▼     ▼   │
//!                 │   store ─▶ state file ─▶ renderer ─▶ artifact ─▶ reload
//!                 └──────────────────────────────────────────┬───────┬───┘
//!                                                            ▼       ▼
//!                                                        promtail   nginx
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

use forge_confd::config::{load_or_default, AppConfig};
use forge_confd::http::{AppState, HttpServer};
use forge_confd::lifecycle::{signals, Shutdown};
use forge_confd::logsources::{LogSource, PromtailRenderer};
use forge_confd::managed::{Manager, ManagedEntry, StateFile};
use forge_confd::observability::{logging, metrics};
use forge_confd::routes::{NginxRenderer, Route};

#[derive(Parser)]
#[command(name = "forge-confd")]
#[command(about = "Runtime manager for nginx routes and promtail log sources", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "FORGE_CONFD_CONFIG", default_value = "forge-confd.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(&args.config)?;

    logging::init_logging(&config.observability);
    tracing::info!(version = env!("CARGO_PKG_VERSION"), config = %args.config.display(), "forge-confd starting");

    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let state = build_state(&config)?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    tokio::spawn(signals::forward_termination(shutdown.clone()));

    let server = HttpServer::new(&config.listener, state);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

fn build_state(config: &AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let routes: Manager<Route> = Manager::open(
        StateFile::new(&config.routes.state_path),
        &config.routes.artifact_path,
        NginxRenderer,
        config.routes.reload.coordinator(),
    )?;
    if config.routes.render_on_start {
        regenerate(&routes);
    }

    let sources: Manager<LogSource> = Manager::open(
        StateFile::new(&config.log_sources.state_path),
        &config.log_sources.artifact_path,
        PromtailRenderer::new(config.log_sources.promtail.clone()),
        config.log_sources.reload.coordinator(),
    )?;
    if config.log_sources.render_on_start {
        regenerate(&sources);
    }

    Ok(AppState::new(
        Arc::new(routes),
        Arc::new(sources),
        config.admin.api_key.clone(),
    ))
}

/// Startup render failures are logged, not fatal: the previous artifact stays.
fn regenerate<E: ManagedEntry>(manager: &Manager<E>) {
    if let Err(e) = manager.regenerate() {
        tracing::error!(kind = E::KIND, error = %e, "Failed to render artifact at startup");
    }
}
