//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Command line arguments parsed from user input.
///
/// CLI values override the configuration file.
#[derive(Debug, Clone, Parser)]
#[command(name = "tabletop-server", version, about = "Lobby server for turn-based games")]
pub struct CliArgs {
    /// Port to listen on. Anything outside 1024-65535 falls back to 10000.
    #[arg(value_name = "PORT", allow_negative_numbers = true)]
    pub port: Option<String>,

    /// Configuration file (TOML).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log file, truncated at startup.
    #[arg(long, value_name = "FILE", default_value = "server.log")]
    pub log_file: PathBuf,

    /// Log level filter (trace, debug, info, warn, error). `RUST_LOG`
    /// takes precedence.
    #[arg(short, long, value_name = "LEVEL", default_value = "info")]
    pub log_level: String,
}

impl CliArgs {
    /// The port as a number. Text that is not a number reads as 0, which
    /// the server then replaces with the default port.
    pub fn requested_port(&self) -> Option<i64> {
        self.port
            .as_deref()
            .map(|port| port.trim().parse().unwrap_or(0))
    }
}
