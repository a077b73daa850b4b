//! vision - CLI tool for the Vision AI identification API.
//!
//! A thin wrapper over `vision-http` and `vision-file` for checking
//! credentials, pulling collections from the live API, and maintaining the
//! flat-file snapshot the dashboard can fall back to.

mod cli;
mod commands;
mod config;
mod output;
mod source;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::{cameras, fetch, get, login};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    let result = match cli.command {
        Commands::Login(args) => login::run(args).await,
        Commands::Fetch(args) => fetch::run(args).await,
        Commands::Get(args) => get::run(args).await,
        Commands::Cameras(args) => cameras::run(args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

// Logs go to stderr; stdout carries records.
fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
