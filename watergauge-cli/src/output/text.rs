//! Text output formatting with colors.

use chrono::Local;
use watergauge_core::{UsageRecord, UsageReport};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats a usage report: latest reading first, then up to `limit`
    /// history rows in export order.
    pub fn format_report(&self, report: &UsageReport, limit: usize) -> String {
        let mut lines = Vec::new();

        match report.latest() {
            Some(latest) => {
                lines.push(format!(
                    "{} {} gal at {}",
                    self.bold("Latest reading:"),
                    latest.gallons,
                    latest
                        .read_timestamp
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M %Z")
                ));
                lines.push(format!(
                    "Account: {} ({})",
                    self.cyan(&latest.account_number),
                    latest.meter_class
                ));
                lines.push(format!("Meter:   {}", latest.meter_reading));
                lines.push(self.leak_line(latest));
            }
            None => lines.push("No parseable readings in this export.".to_string()),
        }

        if !report.records.is_empty() {
            let shown = report.records.len().min(limit);
            lines.push(format!(
                "History ({} of {} records, {:.1} gal total):",
                shown,
                report.records.len(),
                report.total_gallons()
            ));
            let start = report.records.len() - shown;
            for record in &report.records[start..] {
                lines.push(self.history_row(record));
            }
        }

        lines.join("\n")
    }

    fn history_row(&self, record: &UsageRecord) -> String {
        let stamp = record.read_timestamp.to_rfc3339();
        let mut row = format!("  {}  {:>7.1} gal", self.dim(&stamp), record.gallons);
        if record.leak_detected {
            row.push_str(&format!("  {}", self.red("leak!")));
        }
        row
    }

    fn leak_line(&self, record: &UsageRecord) -> String {
        if record.leak_detected {
            format!(
                "Leak:    {} ({} gal)",
                self.red("DETECTED"),
                record.leak_volume
            )
        } else {
            "Leak:    none detected".to_string()
        }
    }

    fn bold(&self, s: &str) -> String {
        self.wrap(s, BOLD)
    }

    fn dim(&self, s: &str) -> String {
        self.wrap(s, DIM)
    }

    fn red(&self, s: &str) -> String {
        self.wrap(s, RED)
    }

    fn cyan(&self, s: &str) -> String {
        self.wrap(s, CYAN)
    }

    fn wrap(&self, s: &str, color: &str) -> String {
        if self.use_colors {
            format!("{color}{s}{RESET}")
        } else {
            s.to_string()
        }
    }
}
