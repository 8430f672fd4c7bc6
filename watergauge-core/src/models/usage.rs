//! Usage-related types.
//!
//! - [`UsageRecord`] - One hourly meter reading from the portal's CSV export
//! - [`UsageReport`] - The full batch returned by one fetch

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Usage Record
// ============================================================================

/// One hourly meter reading, parsed from a single CSV row.
///
/// Records are immutable values constructed fresh on every fetch; no
/// identity persists across fetches. Consumers that want history must keep
/// the full sequence from each fetch themselves.
///
/// `read_timestamp` is always UTC regardless of how the portal formats its
/// local timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Utility account the reading belongs to.
    pub account_number: String,
    /// When the meter was read, normalized to UTC.
    pub read_timestamp: DateTime<Utc>,
    /// Cumulative meter register value.
    pub meter_reading: f64,
    /// Gallons consumed in this interval.
    pub gallons: f64,
    /// Whether the portal flagged a leak for this interval.
    ///
    /// The portal's flag column is free-form; `"0"`, `"false"`, `"no"` and
    /// empty all mean no leak, anything else means a leak. This permissive
    /// reading is intentional.
    pub leak_detected: bool,
    /// Estimated leak volume in gallons.
    pub leak_volume: f64,
    /// Meter classification (e.g. `"Residential"`).
    pub meter_class: String,
}

// ============================================================================
// Usage Report
// ============================================================================

/// The batch of records produced by one fetch, in CSV order.
///
/// The portal does not promise temporal order, so the latest reading is
/// selected by timestamp, not position. An empty report is a valid result
/// (a fetch that failed outright returns an error instead).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    /// Records in the order the portal's CSV listed them.
    pub records: Vec<UsageRecord>,
    /// When this batch was fetched.
    pub fetched_at: DateTime<Utc>,
}

impl UsageReport {
    /// Wraps a batch of records, stamping the fetch time as now.
    pub fn new(records: Vec<UsageRecord>) -> Self {
        Self {
            records,
            fetched_at: Utc::now(),
        }
    }

    /// Returns the record with the most recent read timestamp, if any.
    pub fn latest(&self) -> Option<&UsageRecord> {
        self.records.iter().max_by_key(|r| r.read_timestamp)
    }

    /// ISO-8601 timestamp of the most recent reading, if any.
    pub fn last_update(&self) -> Option<String> {
        self.latest().map(|r| r.read_timestamp.to_rfc3339())
    }

    /// Number of records in this batch.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if the batch contained no parseable rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total gallons across the batch.
    pub fn total_gallons(&self) -> f64 {
        self.records.iter().map(|r| r.gallons).sum()
    }

    /// Returns true if any record in the batch has the leak flag set.
    pub fn has_leak(&self) -> bool {
        self.records.iter().any(|r| r.leak_detected)
    }
}

// ============================================================================
// Tests
// ============================================================================
