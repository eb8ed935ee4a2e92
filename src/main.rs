//! Movie Library CLI - browse movies and keep a watchlist
//!
//! A command-line front end over TMDB and a streaming availability API,
//! with the watchlist and ratings kept on local disk.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use movielib::cli::{AppConfig, Cli};
use movielib::commands;

/// Sends logs to stderr so command output stays clean on stdout
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,movielib={}", config.log_filter())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&AppConfig::from_cli(&cli));

    let mut stdout = io::stdout().lock();
    match commands::run(&cli, &mut stdout).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
