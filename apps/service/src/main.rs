mod cli;
mod commands;
mod config;
mod database;
mod models;
mod monitoring;
mod pool;
mod sites;
mod validation;

use std::process::ExitCode;

use clap::Parser;

use cli::{Cli, Command};
use commands::App;
use config::Config;
use sites::SiteError;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match Config::from_config(cli.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    logger::init_tracing(&config.logging.level, config.logging.format.parse().ok());

    match run(cli.command, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<SiteError>() {
                Some(SiteError::DuplicateSite(url)) => {
                    eprintln!("Rejected: a site with url {url} is already registered")
                }
                _ => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, config: Config) -> anyhow::Result<()> {
    if command == Command::Config {
        print!("{config}");
        return Ok(());
    }

    App::open(config).await?.execute(command).await
}
