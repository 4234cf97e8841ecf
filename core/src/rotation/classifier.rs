//! Rotation window state machine.
//!
//! One classifier runs per enabled window rule. It opens a window when the
//! tracked actor casts the rule's opener with the resource gate met,
//! collects the actor's casts while the opener's granted status holds, and
//! evaluates the window when that status drops.

use chrono::NaiveDateTime;

use crate::events::{AnalysisSignal, ResourceSnapshot, SignalHandler};
use crate::profile::WindowRule;

/// One cast observed inside an open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CastRecord {
    pub ability_id: i64,
    pub at: NaiveDateTime,
}

/// A tracked window, retained after close for reporting.
///
/// The opener cast marks `opened_at` but is not a member of `casts`;
/// membership starts with the first cast after it.
#[derive(Debug, Clone, PartialEq)]
pub struct RotationWindow {
    pub opened_at: NaiveDateTime,
    pub closed_at: Option<NaiveDateTime>,
    pub casts: Vec<CastRecord>,
    pub qualifying_count: u32,
}

impl RotationWindow {
    fn open(at: NaiveDateTime) -> Self {
        Self {
            opened_at: at,
            closed_at: None,
            casts: Vec::new(),
            qualifying_count: 0,
        }
    }

    /// Qualifying casts short of `expected`, clamped at zero.
    pub fn shortfall(&self, expected: u32) -> u32 {
        expected.saturating_sub(self.qualifying_count)
    }
}

/// Classification errors accumulated over the encounter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassifierTally {
    /// Opener casts rejected by the resource gate.
    pub gate_violations: u32,
    /// Total qualifying-cast shortfall across closed windows.
    pub missed_actions: u32,
}

#[derive(Debug, Clone, Default)]
enum WindowState {
    #[default]
    Idle,
    Open(RotationWindow),
}

/// Per-rule cast classifier for one tracked actor.
#[derive(Debug)]
pub struct WindowClassifier {
    rule: WindowRule,
    actor_id: i64,
    state: WindowState,
    windows: Vec<RotationWindow>,
    tally: ClassifierTally,
}

impl WindowClassifier {
    pub fn new(rule: WindowRule, actor_id: i64) -> Self {
        Self {
            rule,
            actor_id,
            state: WindowState::Idle,
            windows: Vec::new(),
            tally: ClassifierTally::default(),
        }
    }

    pub fn rule(&self) -> &WindowRule {
        &self.rule
    }

    pub fn tally(&self) -> ClassifierTally {
        self.tally
    }

    /// Closed windows in open order.
    pub fn windows(&self) -> &[RotationWindow] {
        &self.windows
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, WindowState::Open(_))
    }

    fn on_cast(
        &mut self,
        ability_id: i64,
        source_id: i64,
        at: NaiveDateTime,
        resources: Option<&ResourceSnapshot>,
    ) {
        if source_id != self.actor_id || self.rule.ignored_ids.contains(&ability_id) {
            return;
        }
        match &mut self.state {
            WindowState::Idle => {
                if ability_id != self.rule.opener_id {
                    return;
                }
                if self.gate_passes(resources) {
                    self.state = WindowState::Open(RotationWindow::open(at));
                } else {
                    self.tally.gate_violations += 1;
                    tracing::debug!(
                        "rule {}: opener at {at} under the resource gate, window not opened",
                        self.rule.name
                    );
                }
            }
            WindowState::Open(window) => {
                window.casts.push(CastRecord { ability_id, at });
                if ability_id == self.rule.qualifying_id {
                    window.qualifying_count += 1;
                }
            }
        }
    }

    /// Resource gate for the opener. The allowance forgives the resources
    /// one regeneration tick would have restored by the time the cast
    /// resolved. Without a snapshot the gate cannot be judged, so it
    /// passes rather than charging the actor a violation.
    fn gate_passes(&self, resources: Option<&ResourceSnapshot>) -> bool {
        let Some(snapshot) = resources else {
            return true;
        };
        if snapshot.maximum == 0 {
            return true;
        }
        let forgiven = snapshot.current.saturating_add(self.rule.tick_allowance);
        f64::from(forgiven) / f64::from(snapshot.maximum) >= self.rule.resource_floor
    }

    fn on_status_removed(&mut self, ability_id: i64, target_id: i64, at: NaiveDateTime) {
        if ability_id == self.rule.status_id && target_id == self.actor_id {
            self.close_window(at);
        }
    }

    fn close_window(&mut self, at: NaiveDateTime) {
        let WindowState::Open(mut window) = std::mem::take(&mut self.state) else {
            return;
        };
        window.closed_at = Some(at);
        self.tally.missed_actions += window.shortfall(self.rule.expected_count);
        self.windows.push(window);
    }

    fn on_encounter_ended(&mut self, at: NaiveDateTime) {
        if self.is_open() {
            tracing::debug!(
                "rule {}: window still open at encounter end, closing at {at}",
                self.rule.name
            );
            self.close_window(at);
        }
    }
}

impl SignalHandler for WindowClassifier {
    fn handle_signal(&mut self, signal: &AnalysisSignal) {
        match signal {
            AnalysisSignal::CastRecorded {
                ability_id,
                source_id,
                timestamp,
                resources,
                ..
            } => {
                self.on_cast(*ability_id, *source_id, *timestamp, resources.as_ref());
            }
            AnalysisSignal::StatusRemoved {
                ability_id,
                target_id,
                timestamp,
                ..
            } => {
                self.on_status_removed(*ability_id, *target_id, *timestamp);
            }
            AnalysisSignal::EncounterEnded { timestamp } => {
                self.on_encounter_ended(*timestamp);
            }
            _ => {}
        }
    }
}
