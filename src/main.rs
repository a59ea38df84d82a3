//! Entry point for the `tack` CLI.
//!
//! Parses arguments, installs logging, dispatches to the command handler,
//! and maps errors to exit codes.

use std::process::ExitCode;
use tack::cli::Cli;
use tack::{commands, exit_codes};
use tracing_subscriber::{EnvFilter, prelude::*};

/// Environment variable holding the log filter (e.g. `TACK_LOG=debug`).
const LOG_ENV: &str = "TACK_LOG";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    // Logs go to stderr so command output on stdout stays scriptable.
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(filter),
        )
        .init();

    match commands::dispatch(cli.command).await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
