//! itemvec CLI
//!
//! Single-command training entry point for the itemvec library.
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! itemvec train config.yaml
//!
//! # Train with overrides
//! itemvec train config.yaml --epochs 10 --lr 0.025
//!
//! # Validate config and data files
//! itemvec validate config.yaml --detailed
//!
//! # Show config info
//! itemvec info config.yaml --format yaml
//! ```

use clap::Parser;
use itemvec::cli::{init_tracing, run_command, Cli, LogLevel};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(LogLevel::from_flags(cli.verbose, cli.quiet));

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
