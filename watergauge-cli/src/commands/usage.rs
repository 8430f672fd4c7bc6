//! Usage command - fetch and display the hourly usage table.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use watergauge_core::UsageReport;
use watergauge_portal::PortalClient;

use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments for the usage command.
#[derive(Args)]
pub struct UsageArgs {
    /// Maximum history rows to print in text output.
    #[arg(long, default_value = "24")]
    pub limit: usize,
}

impl Default for UsageArgs {
    fn default() -> Self {
        Self { limit: 24 }
    }
}

/// Runs the usage command.
pub async fn run(args: &UsageArgs, cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?;

    let mut client = PortalClient::new(config).context("building portal client")?;
    let records = client.fetch_usage().await.context("fetching usage")?;
    info!(records = records.len(), "Fetch complete");

    let report = UsageReport::new(records);
    match cli.format {
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_report(&report)?);
        }
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_report(&report, args.limit));
        }
    }

    Ok(())
}
