//! `dts` command-line entry point.
//!
//! ```text
//!   config.ini ─▶ loader ─▶ validation ─▶ overrides ─▶ resolver ─▶ dispatcher ─▶ executor
//!                                                                      ▲
//!   SIGINT/SIGTERM ─▶ signals ─▶ shutdown controller ── cancel token ──┘
//!                                        │
//!                                        └─ grace period elapsed ─▶ exit(0)
//! ```

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tokio::sync::mpsc;

use dts_cli::cli::Cli;
use dts_cli::commands;
use dts_cli::lifecycle::{signals, ShutdownController};
use dts_cli::observability::logging;
use dts_cli::task::{Dispatcher, LoggingExecutor};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_level.as_deref(), cli.verbose) {
        eprintln!("Error: {e}");
        return ExitCode::from(e.exit_code());
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "dts starting");

    let controller = ShutdownController::from_env();
    tracing::debug!(grace_period_secs = controller.grace_period().as_secs(), "Shutdown controller ready");

    let (signal_tx, signal_rx) = mpsc::channel(4);
    let signal_listener = signals::spawn_listener(signal_tx);
    let shutdown_listener = tokio::spawn({
        let controller = controller.clone();
        async move { controller.listen(signal_rx).await }
    });

    let dispatcher = Dispatcher::new(LoggingExecutor);
    let result = commands::execute(&cli, &dispatcher, controller.token(), &mut io::stdout()).await;

    controller.complete();
    signal_listener.abort();
    shutdown_listener.abort();

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}
