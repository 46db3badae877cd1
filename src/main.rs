mod app;
mod chain;
mod cli;
mod config;
mod delay;
mod driver;
mod error;
mod events;
mod generator;
mod key;
mod state_machine;
mod token;
mod ui;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::Mode;
use chain::AlloyChainClient;
use cli::{Cli, Command};
use config::FarmConfig;
use error::FarmError;
use ui::ConsoleReporter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            let code = err.downcast_ref::<FarmError>().map_or(1, FarmError::exit_code);
            ExitCode::from(code)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "txfarm=debug,warn" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = FarmConfig::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);

    let mode = match cli.command {
        Command::Deploy { .. } => Mode::Contracts,
        Command::Tokens { .. } => Mode::Tokens,
        Command::Run => Mode::All,
    };

    let mut reporter = ConsoleReporter::new(&config.network_name, &config.native_symbol);
    let report = app::execute(&config, mode, &mut reporter, |signer| {
        AlloyChainClient::connect(&config.rpc_url, signer, config.client_settings())
            .map_err(FarmError::from)
    })
    .await?;

    if cli.json {
        reporter
            .print_report(&report)
            .context("failed to serialize run report")?;
    }
    Ok(())
}
