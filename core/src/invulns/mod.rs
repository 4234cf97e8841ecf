//! Invulnerability window tracking.
//!
//! Watches a configured set of status ids on every entity in the log and
//! records the closed `[start, end]` windows they produce. Uptime queries
//! subtract windows of kind [`InvulnKind::Invulnerable`] from buff
//! intervals; [`InvulnKind::Invincible`] marks phases where the entity
//! takes no damage but debuffs still tick, so those are recorded for
//! display and left out of the subtraction.

use chrono::NaiveDateTime;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::events::{AnalysisSignal, SignalHandler};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvulnKind {
    /// Effects cannot progress; excluded from uptime.
    Invulnerable,
    /// Damage is prevented but effects still run; counts toward uptime.
    Invincible,
}

/// One closed immunity window on one entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InvulnWindow {
    pub entity_id: i64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub kind: InvulnKind,
}

/// Read access to recorded windows, per entity.
pub trait InvulnSource {
    fn windows_for(&self, entity_id: i64) -> &[InvulnWindow];
}

/// Recorded windows grouped by entity. Also serves as the empty source
/// for queries that ignore invulnerability.
#[derive(Debug, Clone, Default)]
pub struct InvulnLog {
    windows: HashMap<i64, Vec<InvulnWindow>>,
}

impl InvulnLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, window: InvulnWindow) {
        self.windows.entry(window.entity_id).or_default().push(window);
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl InvulnSource for InvulnLog {
    fn windows_for(&self, entity_id: i64) -> &[InvulnWindow] {
        self.windows
            .get(&entity_id)
            .map_or(&[], |windows| windows.as_slice())
    }
}

/// Signal handler that turns watched status applications into windows.
///
/// Unlike the buff tracker this watches every entity; immunity phases
/// matter regardless of which actor the analysis is scoped to.
#[derive(Debug)]
pub struct InvulnTracker {
    watched: HashMap<i64, InvulnKind>,
    open: HashMap<(i64, i64), NaiveDateTime>,
    encounter_start: Option<NaiveDateTime>,
    log: InvulnLog,
}

impl InvulnTracker {
    pub fn new(watch: impl IntoIterator<Item = (i64, InvulnKind)>) -> Self {
        Self {
            watched: watch.into_iter().collect(),
            open: HashMap::new(),
            encounter_start: None,
            log: InvulnLog::new(),
        }
    }

    pub fn log(&self) -> &InvulnLog {
        &self.log
    }

    fn open_window(&mut self, ability_id: i64, entity_id: i64, at: NaiveDateTime) {
        if !self.watched.contains_key(&ability_id) {
            return;
        }
        // Duplicate applies keep the earliest start.
        self.open.entry((entity_id, ability_id)).or_insert(at);
    }

    fn close_window(&mut self, ability_id: i64, entity_id: i64, at: NaiveDateTime) {
        let Some(&kind) = self.watched.get(&ability_id) else {
            return;
        };
        let start = match self.open.remove(&(entity_id, ability_id)) {
            Some(start) => start,
            // Active before logging began: backfill from encounter start.
            None => self.encounter_start.unwrap_or(at),
        };
        self.log.push(InvulnWindow {
            entity_id,
            start,
            end: at,
            kind,
        });
    }

    fn close_all(&mut self, at: NaiveDateTime) {
        let mut keys: Vec<(i64, i64)> = self.open.keys().copied().collect();
        keys.sort_unstable();
        for (entity_id, ability_id) in keys {
            self.close_window(ability_id, entity_id, at);
        }
    }
}

impl SignalHandler for InvulnTracker {
    fn handle_signal(&mut self, signal: &AnalysisSignal) {
        match signal {
            AnalysisSignal::EncounterStarted { timestamp } => {
                self.encounter_start = Some(*timestamp);
            }
            AnalysisSignal::StatusApplied {
                ability_id,
                target_id,
                timestamp,
                ..
            } => {
                self.open_window(*ability_id, *target_id, *timestamp);
            }
            AnalysisSignal::StatusRemoved {
                ability_id,
                target_id,
                timestamp,
                ..
            } => {
                self.close_window(*ability_id, *target_id, *timestamp);
            }
            AnalysisSignal::EncounterEnded { timestamp } => {
                self.close_all(*timestamp);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    const SHIELD: i64 = 8000;
    const BOSS: i64 = 99;

    fn ts(secs: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
            + Duration::seconds(secs)
    }

    fn make_tracker() -> InvulnTracker {
        let mut tracker = InvulnTracker::new([(SHIELD, InvulnKind::Invulnerable)]);
        tracker.handle_signal(&AnalysisSignal::EncounterStarted { timestamp: ts(0) });
        tracker
    }

    fn applied(ability_id: i64, at: NaiveDateTime) -> AnalysisSignal {
        AnalysisSignal::StatusApplied {
            ability_id,
            source_id: Some(BOSS),
            target_id: BOSS,
            timestamp: at,
            is_debuff: false,
        }
    }

    fn removed(ability_id: i64, at: NaiveDateTime) -> AnalysisSignal {
        AnalysisSignal::StatusRemoved {
            ability_id,
            source_id: Some(BOSS),
            target_id: BOSS,
            timestamp: at,
            is_debuff: false,
        }
    }

    #[test]
    fn test_watched_status_produces_window() {
        let mut tracker = make_tracker();
        tracker.handle_signal(&applied(SHIELD, ts(8)));
        tracker.handle_signal(&removed(SHIELD, ts(12)));

        let windows = tracker.log().windows_for(BOSS);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, ts(8));
        assert_eq!(windows[0].end, ts(12));
        assert_eq!(windows[0].kind, InvulnKind::Invulnerable);
    }

    #[test]
    fn test_unwatched_status_ignored() {
        let mut tracker = make_tracker();
        tracker.handle_signal(&applied(1234, ts(8)));
        tracker.handle_signal(&removed(1234, ts(12)));

        assert!(tracker.log().is_empty());
    }

    #[test]
    fn test_open_window_closed_at_encounter_end() {
        let mut tracker = make_tracker();
        tracker.handle_signal(&applied(SHIELD, ts(8)));
        tracker.handle_signal(&AnalysisSignal::EncounterEnded { timestamp: ts(30) });

        let windows = tracker.log().windows_for(BOSS);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].end, ts(30));
    }

    #[test]
    fn test_removal_without_apply_backfills_encounter_start() {
        let mut tracker = make_tracker();
        tracker.handle_signal(&removed(SHIELD, ts(6)));

        let windows = tracker.log().windows_for(BOSS);
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].start, ts(0));
        assert_eq!(windows[0].end, ts(6));
    }

    #[test]
    fn test_windows_for_unknown_entity_is_empty() {
        let tracker = make_tracker();
        assert!(tracker.log().windows_for(42).is_empty());
    }
}
