// crates/decor-layout-server/src/main.rs
// ============================================================================
// Module: Layout Service Entry Point
// Description: CLI wrapper starting the HTTP layout service.
// Purpose: Load config, run migrations on demand, and serve until shutdown.
// Dependencies: axum, clap, decor-layout-core, decor-layout-server,
// decor-layout-store-sqlite, thiserror, tokio
// ============================================================================

//! ## Overview
//! The binary loads a TOML config, optionally runs the storage migration,
//! then serves the layout protocol until interrupted. The store is opened
//! before the listener binds so an uninitialized database refuses startup
//! with the actionable migration message instead of failing per-request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use decor_layout_core::StoreError;
use decor_layout_core::WarehouseId;
use decor_layout_server::AppState;
use decor_layout_server::ConfigError;
use decor_layout_server::NoopMetrics;
use decor_layout_server::ServerConfig;
use decor_layout_server::build_router;
use decor_layout_store_sqlite::SqliteLayoutStore;
use decor_layout_store_sqlite::run_migration;
use thiserror::Error;

// ============================================================================
// SECTION: CLI
// ============================================================================

/// Warehouse decor layout service.
#[derive(Debug, Parser)]
#[command(name = "decor-layout-server", version, disable_help_subcommand = true)]
struct Cli {
    /// Path to the TOML config file.
    #[arg(long, value_name = "PATH")]
    config: PathBuf,
    /// Run the storage migration and exit.
    #[arg(long)]
    migrate: bool,
}

/// Top-level service errors surfaced to the operator.
#[derive(Debug, Error)]
enum ServeError {
    /// Configuration loading or validation failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The layout store failed to open or migrate.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Listener or output I/O failed.
    #[error("io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(std::io::stderr(), "decor-layout-server: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Loads config and dispatches to migration or serving.
async fn run() -> Result<(), ServeError> {
    let cli = Cli::parse();
    let config = ServerConfig::load_from_path(&cli.config)?;
    if cli.migrate {
        let target = WarehouseId::new(config.default_warehouse_id.clone());
        let migrated = run_migration(&config.store.path, &config.store.legacy_org_id, &target)?;
        write_stdout_line(&format!(
            "migration complete: versioned table ready, {migrated} legacy layouts copied"
        ))?;
        return Ok(());
    }
    serve(config).await
}

/// Opens the store and serves the layout protocol until interrupted.
async fn serve(config: ServerConfig) -> Result<(), ServeError> {
    let store = SqliteLayoutStore::open(&config.store)?;
    let state = AppState {
        store: Arc::new(store),
        metrics: Arc::new(NoopMetrics),
        default_warehouse_id: WarehouseId::new(config.default_warehouse_id.clone()),
    };
    let app = build_router(state, config.max_body_bytes);
    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|err| ServeError::Io(format!("bind {} failed: {err}", config.listen_addr)))?;
    write_stderr_line(&format!("layout service listening on {}", config.listen_addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| ServeError::Io(err.to_string()))
}

/// Resolves when the process receives an interrupt signal.
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes one line to stdout.
fn write_stdout_line(line: &str) -> Result<(), ServeError> {
    writeln!(std::io::stdout(), "{line}").map_err(|err| ServeError::Io(err.to_string()))
}

/// Writes one line to stderr.
fn write_stderr_line(line: &str) -> Result<(), ServeError> {
    writeln!(std::io::stderr(), "{line}").map_err(|err| ServeError::Io(err.to_string()))
}
