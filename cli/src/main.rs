mod cli;
mod commands;

use anyhow::Context;
use baiemap::{Catalog, Config};
use cli::{Cli, Commands};
use commands::{export, summary, table};
use tracing_subscriber::EnvFilter;

/// Logs go to stderr; `RUST_LOG` overrides the level picked from `-v`.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    Ok(match (&cli.config, &cli.offline) {
        (Some(path), _) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        (None, Some(dir)) => Config::offline(dir),
        (None, None) => Config::default(),
    })
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let catalog = Catalog::from_config(load_config(&cli)?)?;
    match &cli.command {
        Commands::Export(args) => export::run(&catalog, args),
        Commands::Table(args) => table::run(&catalog, args),
        Commands::Summary => summary::run(&catalog),
    }
}

fn main() -> anyhow::Result<()> { run() }
