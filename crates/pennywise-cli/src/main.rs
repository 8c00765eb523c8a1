//! Pennywise CLI - Smart spending suggestions
//!
//! Usage:
//!   pennywise serve --port 10000               Start the API server
//!   pennywise analyze --file expenses.json     Analyze an exported expense file
//!   pennywise recommend --file expenses.json   Recommend monthly budgets

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; real deployments set the environment directly
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Serve {
            port,
            host,
            backend_url,
        } => commands::cmd_serve(port, host.as_deref(), backend_url.as_deref()).await,
        Commands::Analyze {
            file,
            json,
            currency,
        } => commands::cmd_analyze(&file, json, &currency),
        Commands::Recommend {
            file,
            budgets,
            json,
            currency,
        } => commands::cmd_recommend(&file, budgets.as_deref(), json, &currency),
    }
}
