//! CLI command implementations.

pub mod check;
pub mod usage;

use anyhow::{Context, Result};
use watergauge_portal::PortalConfig;

use crate::Cli;

/// Loads configuration from `--config` or the default path.
pub fn load_config(cli: &Cli) -> Result<PortalConfig> {
    match &cli.config {
        Some(path) => PortalConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => PortalConfig::load().with_context(|| {
            format!(
                "loading config from {} (pass --config to use another file)",
                PortalConfig::default_path().display()
            )
        }),
    }
}
