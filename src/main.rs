//! Hostwatch Binary Entry Point
//!
//! This binary runs the complete hostwatch monitoring system.
//! Core functionality is provided by the `hostwatch` library crate.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use hostwatch::{
    AppConfig, IcmpProber, SampleCollector, Scheduler, SqlitePool, init_schema,
    server::{AppState, create_router},
    storage::{HostStore, ResultStore},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Hostwatch - Network Host Reachability Monitor
#[derive(Parser, Debug)]
#[command(name = "hostwatch", version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hostwatch.yaml", env = "HOSTWATCH_CONFIG")]
    config: String,

    /// Server bind address (overrides config file)
    #[arg(long, env = "HOSTWATCH_SERVER_BIND")]
    server_bind: Option<String>,

    /// Server port (overrides config file)
    #[arg(long, env = "HOSTWATCH_SERVER_PORT")]
    server_port: Option<u16>,

    /// Database path (overrides config file)
    #[arg(long, env = "HOSTWATCH_DB_PATH")]
    db_path: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hostwatch=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Hostwatch - Network Host Reachability Monitor");

    let cli = Cli::parse();

    tracing::info!("Loading configuration from: {}", cli.config);
    let mut config = AppConfig::load_or_default(&cli.config)?;

    // Apply CLI/env overrides (CLI > ENV > config file)
    if let Some(bind) = cli.server_bind {
        config.server.bind = bind;
    }
    if let Some(port) = cli.server_port {
        config.server.port = port;
    }
    if let Some(path) = cli.db_path {
        config.database.path = path;
    }
    config.validate()?;

    tracing::info!(
        "Server: {}:{}, Database: {}",
        config.server.bind,
        config.server.port,
        config.database.path,
    );

    // Initialize storage
    let db_url = config.database.connection_url();
    let pool = SqlitePool::connect(&db_url).await?;
    init_schema(&pool).await?;
    tracing::info!("Storage initialized");

    let host_store = HostStore::new(pool.clone());
    let result_store = ResultStore::new(pool.clone());

    // Spawn the probe scheduler
    let collector = SampleCollector::new(Arc::new(IcmpProber::new()), config.probe.policy.clone());
    let scheduler = Scheduler::new(
        host_store.clone(),
        result_store.clone(),
        collector,
        config.probe.cycle_interval,
    );
    let scheduler_handle = scheduler.spawn();

    // Build the web server
    let app_state = AppState {
        host_store,
        result_store,
    };
    let app = create_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    tracing::info!("Web server listening on: http://{}", addr);
    tracing::info!("Press Ctrl+C to shutdown");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutting down scheduler...");
    scheduler_handle.shutdown().await;

    tracing::info!("Shutting down storage...");
    pool.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal");
        }
    }
}
