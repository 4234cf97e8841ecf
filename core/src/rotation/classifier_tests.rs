//! Tests for the window classifier
//!
//! Drives the state machine with hand-built signals and checks gating,
//! membership, evaluation, and tally accumulation.

use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::classifier::WindowClassifier;
use crate::events::{AnalysisSignal, ResourceSnapshot, SignalHandler};
use crate::profile::WindowRule;

const ACTOR: i64 = 10;
const OPENER: i64 = 100;
const QUALIFYING: i64 = 200;
const STATUS: i64 = 900;
const FILLER: i64 = 300;
const NOOP: i64 = 1;

fn ts(secs: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14)
        .unwrap()
        .and_hms_opt(20, 0, 0)
        .unwrap()
        + Duration::seconds(secs)
}

fn rule() -> WindowRule {
    WindowRule {
        name: "burst".to_string(),
        opener_id: OPENER,
        status_id: STATUS,
        qualifying_id: QUALIFYING,
        expected_count: 5,
        resource_floor: 0.8,
        tick_allowance: 0,
        ignored_ids: vec![NOOP],
        enabled: true,
    }
}

fn make_classifier() -> WindowClassifier {
    WindowClassifier::new(rule(), ACTOR)
}

fn cast_by(
    source: i64,
    ability_id: i64,
    at: NaiveDateTime,
    resources: Option<(u32, u32)>,
) -> AnalysisSignal {
    AnalysisSignal::CastRecorded {
        ability_id,
        source_id: source,
        target_id: None,
        timestamp: at,
        resources: resources.map(|(current, maximum)| ResourceSnapshot { current, maximum }),
    }
}

fn cast(ability_id: i64, at: NaiveDateTime, resources: Option<(u32, u32)>) -> AnalysisSignal {
    cast_by(ACTOR, ability_id, at, resources)
}

fn status_removed(ability_id: i64, target_id: i64, at: NaiveDateTime) -> AnalysisSignal {
    AnalysisSignal::StatusRemoved {
        ability_id,
        source_id: Some(ACTOR),
        target_id,
        timestamp: at,
        is_debuff: false,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Opening and the resource gate
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_opener_above_floor_opens_window() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), Some((8500, 10_000))));

    assert!(classifier.is_open());
    assert_eq!(classifier.tally().gate_violations, 0);
}

#[test]
fn test_opener_below_floor_tallies_violation() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), Some((7000, 10_000))));

    assert!(!classifier.is_open());
    assert_eq!(classifier.tally().gate_violations, 1);
    assert!(classifier.windows().is_empty());
}

#[test]
fn test_tick_allowance_forgives_margin() {
    let mut rule = rule();
    rule.tick_allowance = 250;
    let mut classifier = WindowClassifier::new(rule, ACTOR);
    // 7800 alone misses the 80% floor; with one tick forgiven it passes.
    classifier.handle_signal(&cast(OPENER, ts(0), Some((7800, 10_000))));

    assert!(classifier.is_open());
    assert_eq!(classifier.tally().gate_violations, 0);
}

#[test]
fn test_missing_snapshot_opens_without_violation() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));

    assert!(classifier.is_open());
    assert_eq!(classifier.tally().gate_violations, 0);
}

#[test]
fn test_other_actor_casts_ignored() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast_by(55, OPENER, ts(0), Some((10_000, 10_000))));

    assert!(!classifier.is_open());
    assert_eq!(classifier.tally().gate_violations, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Window membership and evaluation
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_casts_accumulate_and_qualifying_counted() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    classifier.handle_signal(&cast(QUALIFYING, ts(1), None));
    classifier.handle_signal(&cast(FILLER, ts(2), None));
    classifier.handle_signal(&cast(QUALIFYING, ts(3), None));
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(10)));

    let windows = classifier.windows();
    assert_eq!(windows.len(), 1);
    let window = &windows[0];
    assert_eq!(window.opened_at, ts(0));
    assert_eq!(window.closed_at, Some(ts(10)));
    assert_eq!(window.casts.len(), 3);
    assert_eq!(window.qualifying_count, 2);
    // 2 of 5 expected: 3 missed.
    assert_eq!(classifier.tally().missed_actions, 3);
}

#[test]
fn test_ignored_ability_never_joins_window() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(NOOP, ts(0), None));
    assert!(!classifier.is_open());

    classifier.handle_signal(&cast(OPENER, ts(1), None));
    classifier.handle_signal(&cast(NOOP, ts(2), None));
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(5)));

    assert!(classifier.windows()[0].casts.is_empty());
}

#[test]
fn test_shortfall_clamped_at_zero() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    for i in 0..6 {
        classifier.handle_signal(&cast(QUALIFYING, ts(1 + i), None));
    }
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(10)));

    assert_eq!(classifier.windows()[0].qualifying_count, 6);
    assert_eq!(classifier.tally().missed_actions, 0);
}

#[test]
fn test_second_opener_during_window_is_member_not_new_window() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    classifier.handle_signal(&cast(OPENER, ts(2), Some((0, 10_000))));
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(5)));

    // The second opener joins the open window; its resource state is not
    // gated and opens nothing new.
    assert_eq!(classifier.windows().len(), 1);
    assert_eq!(classifier.windows()[0].casts.len(), 1);
    assert_eq!(classifier.tally().gate_violations, 0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Closing
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_close_requires_matching_status_and_target() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    classifier.handle_signal(&status_removed(4444, ACTOR, ts(3)));
    classifier.handle_signal(&status_removed(STATUS, 55, ts(4)));
    assert!(classifier.is_open());

    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(5)));
    assert!(!classifier.is_open());
    assert_eq!(classifier.windows().len(), 1);
}

#[test]
fn test_removal_while_idle_is_ignored() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(3)));

    assert!(classifier.windows().is_empty());
    assert_eq!(classifier.tally().missed_actions, 0);
}

#[test]
fn test_window_closed_at_encounter_end() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    classifier.handle_signal(&cast(QUALIFYING, ts(1), None));
    classifier.handle_signal(&AnalysisSignal::EncounterEnded { timestamp: ts(30) });

    let windows = classifier.windows();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].closed_at, Some(ts(30)));
    assert_eq!(classifier.tally().missed_actions, 4);
}

#[test]
fn test_windows_retained_in_open_order() {
    let mut classifier = make_classifier();
    classifier.handle_signal(&cast(OPENER, ts(0), None));
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(5)));
    classifier.handle_signal(&cast(OPENER, ts(10), None));
    classifier.handle_signal(&status_removed(STATUS, ACTOR, ts(15)));

    let windows = classifier.windows();
    assert_eq!(windows.len(), 2);
    assert_eq!(windows[0].opened_at, ts(0));
    assert_eq!(windows[1].opened_at, ts(10));
}
