// CLI-specific lint overrides
#![allow(clippy::print_stdout, reason = "CLI tools print to stdout")]
#![allow(clippy::print_stderr, reason = "CLI tools print to stderr")]
#![allow(clippy::unwrap_used, reason = "CLI can unwrap for user-facing errors")]
#![allow(clippy::expect_used, reason = "CLI can expect for user-facing errors")]

mod bundle;
mod cli;
mod commands;
mod output;

use clap::Parser;
use cli::{Cli, Commands};
use color_eyre::eyre::Result;
use safe_shield::ShieldConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    init_tracing();

    let config = ShieldConfig::load_from(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze(args) => commands::analyze::run(args, &config, cli.json).await,
        Commands::Scan(args) => commands::scan::run(args, &config, cli.json).await,
    }
}

/// Logs go to stderr so `--json` output stays machine readable
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("safe_shield=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
