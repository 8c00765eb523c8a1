//! CLI argument definitions using clap
//!
//! The command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Pennywise - Smart suggestions for your spending
#[derive(Parser)]
#[command(name = "pennywise")]
#[command(about = "Spending analysis and budget recommendation service", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the API server
    ///
    /// Settings come from the environment (BACKEND_URL, PORT, HOST, APP_ENV,
    /// ALLOWED_ORIGINS, UPSTREAM_TIMEOUT_SECS, CURRENCY_SYMBOL); flags override them.
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,

        /// Upstream backend base URL (overrides BACKEND_URL)
        #[arg(long)]
        backend_url: Option<String>,
    },

    /// Analyze expenses from a JSON file
    ///
    /// The file holds either an array of expense records or a
    /// `{"data": [...]}` envelope as returned by the backend.
    Analyze {
        /// Expense records file
        #[arg(short, long)]
        file: PathBuf,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,

        /// Currency symbol used in messages
        #[arg(long, default_value = "₹")]
        currency: String,
    },

    /// Recommend monthly budgets from a JSON expense file
    Recommend {
        /// Expense records file
        #[arg(short, long)]
        file: PathBuf,

        /// Current budgets file (array or `{"data": [...]}` envelope)
        #[arg(short, long)]
        budgets: Option<PathBuf>,

        /// Print the raw JSON result
        #[arg(long)]
        json: bool,

        /// Currency symbol used in messages
        #[arg(long, default_value = "₹")]
        currency: String,
    },
}
