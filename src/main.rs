//! MIV AutoML - Main Entry Point
//!
//! Interactive three-stage AutoML wizard in the terminal.

use clap::Parser;
use miv_automl::cli::{run_interactive, Cli};
use miv_automl::stages::WizardConfig;

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "miv_automl=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let _cli = Cli::parse();

    run_interactive(WizardConfig::default())
}
