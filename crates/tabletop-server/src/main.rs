//! Tabletop server binary.
//!
//! Loads configuration, sets up logging to the console and a log file,
//! binds the listener, and runs the accept loop next to the operator
//! console until `quit` or a fatal error.

mod cli;
mod console;
mod race;

use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tabletop::{ServerConfig, TabletopServerBuilder};
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::CliArgs;
use crate::race::RaceToGoal;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    if let Err(e) = setup_logging(&args.log_level, &args.log_file) {
        eprintln!("cannot set up logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "server stopped");
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Logging Setup
// ============================================================================

/// Logs to stdout and to `log_file`, which is truncated first.
fn setup_logging(log_level: &str, log_file: &Path) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let file = File::create(log_file)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .try_init()?;

    info!(level = log_level, file = %log_file.display(), "logging initialized");
    Ok(())
}

// ============================================================================
// Server
// ============================================================================

async fn run(args: CliArgs) -> Result<(), Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path).await?,
        None => ServerConfig::default(),
    };
    if let Some(port) = args.requested_port() {
        config = config.with_requested_port(port);
    }

    let server = TabletopServerBuilder::new()
        .config(config)
        .build::<RaceToGoal>()
        .await?;
    info!(addr = %server.local_addr()?, "listening");

    let state = server.state();
    let mut acceptor = tokio::spawn(server.run());

    tokio::select! {
        result = &mut acceptor => {
            result??;
        }
        () = console::run(Arc::clone(&state)) => {
            info!("quit requested, shutting down");
            acceptor.abort();
        }
    }
    Ok(())
}
