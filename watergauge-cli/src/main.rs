// Lint configuration for this crate
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! WaterGauge CLI - hourly water usage from the command line.
//!
//! # Examples
//!
//! ```bash
//! # Fetch and show the current usage table
//! watergauge
//!
//! # Show more history rows
//! watergauge usage --limit 48
//!
//! # JSON output for scripting
//! watergauge --format json --pretty
//!
//! # Probe portal connectivity and authentication
//! watergauge check
//!
//! # Use a specific config file
//! watergauge --config ./watergauge.toml
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{check, usage};

// ============================================================================
// CLI Definition
// ============================================================================

/// WaterGauge CLI - hourly water usage retrieval.
#[derive(Parser)]
#[command(name = "watergauge")]
#[command(about = "Hourly water usage from WaterSmart-style utility portals")]
#[command(long_about = r#"
WaterGauge logs in to a WaterSmart-style municipal utility portal
(handling an emailed two-factor code when the portal asks for one),
downloads the hourly CSV export, and prints the parsed readings.

Configuration lives in a TOML file; by default
<config dir>/watergauge/config.toml:

  [portal]
  base_url = "https://austintx.watersmart.com"
  username = "resident@example.com"
  password = "..."

  [mailbox]            # only needed when the account has 2FA enabled
  host = "imap.example.com"
  username = "resident@example.com"
  password = "..."

Examples:
  watergauge                     # fetch and print the usage table
  watergauge --format json       # JSON output
  watergauge check               # connectivity/auth probe
"#)]
#[command(version)]
#[command(author = "WaterGauge Contributors")]
pub struct Cli {
    /// Subcommand to run. If none, runs 'usage' by default.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to the configuration file.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (text or json).
    #[arg(long, short = 'f', default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Verbose output (show debug info).
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fetch the current usage table (default if no command specified).
    #[command(visible_alias = "u")]
    Usage(usage::UsageArgs),

    /// Probe portal connectivity and authentication.
    Check,
}

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    Text,
    /// Machine-readable JSON.
    Json,
}

// ============================================================================
// Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Some(Commands::Usage(args)) => usage::run(args, &cli).await,
        Some(Commands::Check) => check::run(&cli).await,
        None => usage::run(&usage::UsageArgs::default(), &cli).await,
    }
}

/// Initializes tracing to stderr, honoring `RUST_LOG` when set.
fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "watergauge_portal=debug,watergauge_core=debug,watergauge_cli=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}
