//! Check command - portal connectivity and authentication probe.

use anyhow::{Context, Result};
use watergauge_core::UsageReport;
use watergauge_portal::PortalClient;

use crate::Cli;

/// Runs the check command: one full fetch, reported as a diagnostic
/// summary instead of a usage table.
pub async fn run(cli: &Cli) -> Result<()> {
    let config = super::load_config(cli)?;

    let mailbox = if config.mailbox.host.is_some() {
        format!(
            "configured ({}, folder {})",
            config.mailbox.host.as_deref().unwrap_or_default(),
            config.mailbox.folder
        )
    } else {
        "not configured (two-factor accounts will fail login)".to_string()
    };

    println!("Portal:  {}", config.portal.base_url);
    println!("Account: {}", config.portal.username);
    println!("Mailbox: {mailbox}");

    let mut client = PortalClient::new(config).context("building portal client")?;
    let records = client
        .fetch_usage()
        .await
        .context("login or download failed")?;

    let report = UsageReport::new(records);
    println!("Login:   ok");
    match report.latest() {
        Some(latest) => println!(
            "Export:  {} records, latest {} ({} gal)",
            report.len(),
            latest.read_timestamp.to_rfc3339(),
            latest.gallons
        ),
        None => println!("Export:  reachable, but no parseable records"),
    }

    Ok(())
}
