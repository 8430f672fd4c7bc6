//! Integration tests for core report types.

use chrono::{TimeZone, Utc};
use watergauge_core::{UsageRecord, UsageReport};

fn sample_record() -> UsageRecord {
    UsageRecord {
        account_number: "123".to_string(),
        read_timestamp: Utc.with_ymd_and_hms(2024, 1, 5, 14, 0, 0).unwrap(),
        meter_reading: 1050.2,
        gallons: 12.5,
        leak_detected: false,
        leak_volume: 0.0,
        meter_class: "Residential".to_string(),
    }
}

#[test]
fn test_report_serialization_roundtrip() {
    let report = UsageReport::new(vec![sample_record()]);
    let json = serde_json::to_string(&report).unwrap();
    let parsed: UsageReport = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed.records[0], sample_record());
}

#[test]
fn test_last_update_is_iso8601() {
    let report = UsageReport::new(vec![sample_record()]);
    assert_eq!(
        report.last_update().as_deref(),
        Some("2024-01-05T14:00:00+00:00")
    );
}
