// Tollgate — Application Entry Point
//
// Parses CLI arguments, initializes structured logging (which never emits
// consumer secrets), and dispatches to the command handler.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tollgate::cli::{execute, Cli};
use tollgate::config::DEFAULT_LOG_FILTER;

fn main() {
    // RUST_LOG=tollgate=debug for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = execute(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
