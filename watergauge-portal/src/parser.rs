//! Parsing of the portal's hourly CSV export.
//!
//! Expected header columns (by name):
//! - `Account Number`
//! - `Read Date` (`YYYY-MM-DD hh:mm:ss AM/PM`, local 12-hour clock, read
//!   as UTC; double spaces collapsed first)
//! - `Meter Reading`
//! - `Gallons`
//! - `Leak Detected` (free-form truthy flag)
//! - `Leak Volume`
//! - `Meter Class`
//!
//! Rows that cannot be parsed are skipped, never fatal: a fetch may
//! legitimately return fewer rows than the export listed, or none at all.

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::StringRecord;
use thiserror::Error;
use tracing::{debug, warn};
use watergauge_core::UsageRecord;

/// Timestamp layout used by the portal's export.
const READ_DATE_FORMAT: &str = "%Y-%m-%d %I:%M:%S %p";

#[derive(Debug, Error)]
enum RowError {
    #[error("missing column '{0}'")]
    MissingField(&'static str),

    #[error("invalid timestamp '{value}': {source}")]
    InvalidTimestamp {
        value: String,
        source: chrono::ParseError,
    },

    #[error("invalid number in '{field}': '{value}'")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },
}

/// Parses the CSV export body into usage records.
///
/// Returns records in CSV order. Rows that fail to parse are logged and
/// dropped; an export with zero parseable rows yields an empty vector,
/// which is a valid result distinct from a fetch error.
pub fn parse_usage_csv(content: &str) -> Vec<UsageRecord> {
    let mut rdr = csv::Reader::from_reader(content.as_bytes());

    let headers = match rdr.headers() {
        Ok(h) => h.clone(),
        Err(e) => {
            warn!(error = %e, "Unreadable CSV header row, returning no records");
            return Vec::new();
        }
    };

    let mut records = Vec::new();
    for result in rdr.records() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable CSV record");
                continue;
            }
        };

        match record_to_usage(&record, &headers) {
            Ok(usage) => records.push(usage),
            Err(e) => debug!(error = %e, "Skipping row because of parse error"),
        }
    }

    records
}

fn record_to_usage(record: &StringRecord, headers: &StringRecord) -> Result<UsageRecord, RowError> {
    let get = |name: &str| -> Option<&str> {
        headers
            .iter()
            .position(|h| h == name)
            .and_then(|idx| record.get(idx))
    };

    let raw_date = get("Read Date").ok_or(RowError::MissingField("Read Date"))?;
    let read_timestamp = parse_read_timestamp(raw_date)?;

    Ok(UsageRecord {
        account_number: get("Account Number").unwrap_or("").to_string(),
        read_timestamp,
        meter_reading: parse_required_number(get("Meter Reading"), "Meter Reading")?,
        gallons: parse_required_number(get("Gallons"), "Gallons")?,
        leak_detected: parse_leak_flag(get("Leak Detected").unwrap_or("0")),
        leak_volume: parse_optional_number(get("Leak Volume"), "Leak Volume")?,
        meter_class: get("Meter Class").unwrap_or("").to_string(),
    })
}

/// Parses the portal's 12-hour timestamps, reading them as UTC.
///
/// The export sometimes pads with a double space between date and time;
/// collapse those before parsing.
fn parse_read_timestamp(raw: &str) -> Result<DateTime<Utc>, RowError> {
    let cleaned = raw.replace("  ", " ");
    NaiveDateTime::parse_from_str(cleaned.trim(), READ_DATE_FORMAT)
        .map(|dt| dt.and_utc())
        .map_err(|source| RowError::InvalidTimestamp {
            value: raw.to_string(),
            source,
        })
}

/// A column the export always carries: the cell may be empty (read as 0)
/// but the column itself must exist in the row.
fn parse_required_number(raw: Option<&str>, field: &'static str) -> Result<f64, RowError> {
    let value = raw.ok_or(RowError::MissingField(field))?;
    parse_number(value, field)
}

/// A column that may be absent entirely; absent reads as 0.
fn parse_optional_number(raw: Option<&str>, field: &'static str) -> Result<f64, RowError> {
    match raw {
        None => Ok(0.0),
        Some(value) => parse_number(value, field),
    }
}

fn parse_number(value: &str, field: &'static str) -> Result<f64, RowError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }
    trimmed.parse().map_err(|_| RowError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Tolerant truthiness for the leak flag: only `"0"`, `"false"`, `"no"`
/// and empty (any case, surrounding whitespace ignored) mean no leak.
fn parse_leak_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_lowercase().as_str(),
        "0" | "false" | "no" | ""
    )
}

// ============================================================================
// Tests
// ============================================================================
