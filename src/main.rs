//! Binary entry point that glues the remote lending service to the TUI.
//! The bootstrapping pipeline: parse the command line, point tracing at a
//! log file (stdout belongs to the terminal UI), build the API client,
//! fire the initial concurrent load, and drive the event loop until the
//! user exits.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use directories::BaseDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use lending_desk::{run_app, ApiClient, App};

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".lending-desk";
/// Log file name stored inside the application data directory.
const LOG_FILE_NAME: &str = "lending-desk.log";

/// Terminal front desk for a small library lending service.
#[derive(Debug, Parser)]
#[command(name = "lending-desk", version, about)]
struct Args {
    /// Base address of the lending service.
    #[arg(
        long,
        env = "LENDING_DESK_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    /// Tracing filter for the log file, e.g. `info` or `lending_desk=debug`.
    #[arg(long, env = "LENDING_DESK_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = init_tracing(&args.log_level)?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        api_url = %args.api_url,
        "starting lending desk"
    );

    let client = ApiClient::new(&args.api_url);
    let mut app = App::new(Arc::new(client));
    app.initial_load().await;
    run_app(&mut app).await
}

/// Route tracing output to `~/.lending-desk/lending-desk.log`. The returned
/// guard must stay alive for the duration of the program so buffered lines
/// are flushed on exit.
fn init_tracing(level: &str) -> Result<WorkerGuard> {
    let base_dirs = BaseDirs::new().context("could not locate home directory")?;
    let log_dir = base_dirs.home_dir().join(DATA_DIR_NAME);
    std::fs::create_dir_all(&log_dir).context("failed to create log directory")?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}
