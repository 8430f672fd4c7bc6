//! JSON output formatting.

use anyhow::Result;
use serde_json::json;
use watergauge_core::UsageReport;

/// JSON formatter.
///
/// The shape mirrors what an automation host surfaces: the latest gallons
/// value as `current`, an ISO-8601 `last_update`, and the full batch under
/// `usage` verbatim.
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats a usage report as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn format_report(&self, report: &UsageReport) -> Result<String> {
        let value = json!({
            "current": report.latest().map(|r| r.gallons),
            "last_update": report.last_update(),
            "fetched_at": report.fetched_at.to_rfc3339(),
            "usage": report.records,
        });

        let output = if self.pretty {
            serde_json::to_string_pretty(&value)?
        } else {
            serde_json::to_string(&value)?
        };
        Ok(output)
    }
}
