use anyhow::Context;
use clap::Parser;
use twinsync::config::Cli;
use twinsync::Config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Err(e) = twinsync::logging::init(cli.verbose) {
        eprintln!("Warning: could not initialize logging: {}", e);
    }

    // Convert CLI args to Config - this validates immediately
    let config = Config::try_from(cli)?;
    tracing::debug!(?config, version = twinsync::VERSION, "configuration validated");

    let report = twinsync::commands::sync::run(&config).context("sync aborted")?;
    report.into_result()?;

    Ok(())
}
