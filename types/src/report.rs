//! Report rows for one analyzed encounter.
//!
//! Everything here serializes to JSON for the `--json` output path; the
//! text renderer reads the same rows. Times inside the encounter are
//! millisecond offsets from encounter start (wall-clock bounds live in
//! [`EncounterMeta`] as display strings) so consumers never need a time
//! library to read a report.

use serde::{Deserialize, Serialize};

/// Wall-clock bounds and ingestion bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterMeta {
    /// Empty when the log held no recognized events.
    pub started_at: String,
    pub ended_at: Option<String>,
    pub duration_ms: i64,
    pub events_processed: u64,
    /// Unrecognized kinds plus anything after the completion marker.
    pub events_ignored: u64,
    /// Lines that failed to decode at all.
    pub lines_skipped: u64,
}

/// Uptime accounting for one tracked status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUptimeRow {
    pub ability_id: i64,
    pub name: String,
    /// Active time net of invulnerability windows.
    pub uptime_ms: i64,
    /// Percentage of encounter duration, 0..=100.
    pub uptime_pct: f64,
    /// Distinct buff instances observed.
    pub applications: u32,
    pub max_stacks: u32,
    /// Stack-weighted active time, gross of invulnerability windows.
    pub weighted_uptime_ms: i64,
}

/// One closed rotation window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowReport {
    pub rule: String,
    pub opened_ms: i64,
    pub closed_ms: i64,
    pub casts: u32,
    pub qualifying_count: u32,
    pub expected_count: u32,
    pub shortfall: u32,
}

/// Accumulated classification failures for one rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleTally {
    pub rule: String,
    /// Opener casts below the resource gate.
    pub gate_violations: u32,
    /// Total qualifying-cast shortfall across closed windows.
    pub missed_actions: u32,
}

/// The complete output of one analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterReport {
    pub encounter: EncounterMeta,
    pub statuses: Vec<StatusUptimeRow>,
    pub windows: Vec<WindowReport>,
    pub tallies: Vec<RuleTally>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EncounterReport {
        EncounterReport {
            encounter: EncounterMeta {
                started_at: "2026-03-14 20:00:00".to_string(),
                ended_at: Some("2026-03-14 20:05:30".to_string()),
                duration_ms: 330_000,
                events_processed: 412,
                events_ignored: 3,
                lines_skipped: 1,
            },
            statuses: vec![StatusUptimeRow {
                ability_id: 7001,
                name: "Burn".to_string(),
                uptime_ms: 291_500,
                uptime_pct: 88.3,
                applications: 4,
                max_stacks: 3,
                weighted_uptime_ms: 512_000,
            }],
            windows: vec![WindowReport {
                rule: "Burst Window".to_string(),
                opened_ms: 12_000,
                closed_ms: 27_000,
                casts: 9,
                qualifying_count: 4,
                expected_count: 5,
                shortfall: 1,
            }],
            tallies: vec![RuleTally {
                rule: "Burst Window".to_string(),
                gate_violations: 1,
                missed_actions: 1,
            }],
        }
    }

    #[test]
    fn test_report_round_trips_through_json() {
        let report = sample();
        let json = serde_json::to_string(&report).expect("serialize");
        let back: EncounterReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, report, "report should survive a JSON round trip");
    }

    #[test]
    fn test_missing_optional_end_deserializes() {
        let json = r#"{
            "encounter": {
                "started_at": "",
                "ended_at": null,
                "duration_ms": 0,
                "events_processed": 0,
                "events_ignored": 0,
                "lines_skipped": 0
            },
            "statuses": [],
            "windows": [],
            "tallies": []
        }"#;
        let report: EncounterReport = serde_json::from_str(json).expect("deserialize");
        assert!(report.encounter.ended_at.is_none());
        assert!(report.statuses.is_empty());
    }
}
