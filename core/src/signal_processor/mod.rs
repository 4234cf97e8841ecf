//! Converts raw [`CombatEvent`]s into [`AnalysisSignal`]s.
//!
//! The processor owns the encounter phase machine: the first recognized
//! event starts the encounter, the `complete` marker ends it, and anything
//! arriving after completion is counted and dropped. It also keeps the
//! session cache current so cast signals carry the caster's latest resource
//! snapshot for the classifiers to gate on.

use crate::events::{AnalysisSignal, CombatEvent, EventKind};
use crate::session::{EncounterPhase, SessionCache};


#[derive(Debug, Default)]
pub struct EventProcessor;

impl EventProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Process one raw event, returning derived signals in emission order.
    ///
    /// Malformed events (a status event without a target, a stack event
    /// without a count) are dropped with a warning; they degrade accuracy
    /// but never abort the pass.
    pub fn process_event(
        &mut self,
        event: &CombatEvent,
        cache: &mut SessionCache,
    ) -> Vec<AnalysisSignal> {
        if cache.phase == EncounterPhase::Completed {
            cache.encounter.events_ignored += 1;
            tracing::warn!(
                "ignoring {:?} at {}: encounter already completed",
                event.kind,
                event.timestamp
            );
            return Vec::new();
        }

        if event.kind == EventKind::Unknown {
            cache.encounter.events_ignored += 1;
            return Vec::new();
        }

        let mut signals = Vec::new();
        if cache.phase == EncounterPhase::Idle {
            cache.phase = EncounterPhase::Running;
            cache.encounter.started_at = Some(event.timestamp);
            tracing::info!("encounter started at {}", event.timestamp);
            signals.push(AnalysisSignal::EncounterStarted {
                timestamp: event.timestamp,
            });
        }

        cache.encounter.events_processed += 1;
        if let Some(source_id) = event.source_id {
            cache.note_actor(source_id, event.timestamp, event.source_resources);
        }

        match event.kind {
            EventKind::ApplyBuff | EventKind::ApplyDebuff => {
                signals.extend(status_applied(event));
            }
            EventKind::ApplyBuffStack
            | EventKind::ApplyDebuffStack
            | EventKind::RemoveBuffStack
            | EventKind::RemoveDebuffStack => {
                signals.extend(stack_adjusted(event));
            }
            EventKind::RemoveBuff | EventKind::RemoveDebuff => {
                signals.extend(status_removed(event));
            }
            EventKind::Cast => {
                signals.extend(cast_recorded(event, cache));
            }
            EventKind::Complete => {
                cache.phase = EncounterPhase::Completed;
                cache.encounter.ended_at = Some(event.timestamp);
                tracing::info!("encounter completed at {}", event.timestamp);
                signals.push(AnalysisSignal::EncounterEnded {
                    timestamp: event.timestamp,
                });
            }
            EventKind::Unknown => {}
        }

        signals
    }
}

fn status_applied(event: &CombatEvent) -> Option<AnalysisSignal> {
    let (ability_id, target_id) = status_fields(event)?;
    Some(AnalysisSignal::StatusApplied {
        ability_id,
        source_id: event.source_id,
        target_id,
        timestamp: event.timestamp,
        is_debuff: event.kind.is_debuff(),
    })
}

fn stack_adjusted(event: &CombatEvent) -> Option<AnalysisSignal> {
    let (ability_id, target_id) = status_fields(event)?;
    let Some(stacks) = event.stack else {
        tracing::warn!(
            "{:?} at {} carries no stack count, dropped",
            event.kind,
            event.timestamp
        );
        return None;
    };
    Some(AnalysisSignal::StackAdjusted {
        ability_id,
        source_id: event.source_id,
        target_id,
        stacks,
        timestamp: event.timestamp,
        is_debuff: event.kind.is_debuff(),
    })
}

fn status_removed(event: &CombatEvent) -> Option<AnalysisSignal> {
    let (ability_id, target_id) = status_fields(event)?;
    Some(AnalysisSignal::StatusRemoved {
        ability_id,
        source_id: event.source_id,
        target_id,
        timestamp: event.timestamp,
        is_debuff: event.kind.is_debuff(),
    })
}

fn cast_recorded(event: &CombatEvent, cache: &SessionCache) -> Option<AnalysisSignal> {
    let Some(ability) = event.ability else {
        tracing::warn!("cast at {} carries no ability, dropped", event.timestamp);
        return None;
    };
    let Some(source_id) = event.source_id else {
        tracing::warn!("cast at {} carries no source, dropped", event.timestamp);
        return None;
    };
    Some(AnalysisSignal::CastRecorded {
        ability_id: ability.guid,
        source_id,
        target_id: event.target_id,
        timestamp: event.timestamp,
        resources: cache.actor_resources(source_id),
    })
}

/// Ability and target shared by every status-effect event; warns and yields
/// `None` when either is missing.
fn status_fields(event: &CombatEvent) -> Option<(i64, i64)> {
    let Some(ability) = event.ability else {
        tracing::warn!(
            "{:?} at {} carries no ability, dropped",
            event.kind,
            event.timestamp
        );
        return None;
    };
    let Some(target_id) = event.target_id else {
        tracing::warn!(
            "{:?} at {} carries no target, dropped",
            event.kind,
            event.timestamp
        );
        return None;
    };
    Some((ability.guid, target_id))
}
