//! Command-line front end for the scope-rules engine.
//!
//! Rule evaluation, explanation and synthesis are exposed as subcommands.
//! Results go to stdout; diagnostics go to stderr.

mod cli;
mod config;
mod error;
mod logging;
mod output;

use clap::Parser;

use crate::cli::Cli;
use crate::config::Config;
use crate::logging::init_logging;

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    let config = match cli.config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&Config::default());
            tracing::error!(error = %e, "invalid configuration");
            std::process::exit(e.exit_code());
        }
    };
    init_logging(&config);
    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        max_depth = config.max_depth,
        max_length = config.max_length,
        "starting scope-rules"
    );

    cli::run(cli, &config)
}
