//! Buff lifecycle tracking over the derived signal stream.
//!
//! The tracker owns every buff record it creates for the life of the pass.
//! Malformed sequences recover instead of aborting: a stack change with no
//! open instance is dropped, a removal with no open instance synthesizes
//! one from encounter start, and a duplicate apply closes the open instance
//! before opening the next. An approximate answer always beats failing the
//! whole encounter over one bad event.

use chrono::{Duration, NaiveDateTime};
use hashbrown::HashMap;

use crate::events::{AnalysisSignal, SignalHandler};
use crate::invulns::InvulnSource;
use crate::query;

use super::instance::{Buff, BuffKey, StackChangeEvent, StackEntry};
use super::resolver::EntityResolver;

/// Ordered buff history for one tracked entity.
#[derive(Debug, Clone)]
pub struct EntityTimeline {
    pub entity_id: i64,
    pub buffs: Vec<Buff>,
}

impl EntityTimeline {
    pub fn new(entity_id: i64) -> Self {
        Self {
            entity_id,
            buffs: Vec::new(),
        }
    }
}

/// Tracks buff intervals per entity from the signal stream.
///
/// At most one open buff exists per (entity, ability) pair at any time;
/// the `open_buffs` index maps each open pair to its slot in the owning
/// entity's timeline. Closed buffs stay in the timeline for querying.
#[derive(Debug)]
pub struct BuffTracker<R: EntityResolver> {
    resolver: R,
    entities: HashMap<i64, EntityTimeline>,
    open_buffs: HashMap<BuffKey, usize>,
    encounter_start: Option<NaiveDateTime>,
    current_time: Option<NaiveDateTime>,
    stack_changes: Vec<StackChangeEvent>,
}

impl<R: EntityResolver> BuffTracker<R> {
    pub fn new(resolver: R) -> Self {
        Self {
            resolver,
            entities: HashMap::new(),
            open_buffs: HashMap::new(),
            encounter_start: None,
            current_time: None,
            stack_changes: Vec::new(),
        }
    }

    /// All tracked entity timelines, in no particular order.
    pub fn timelines(&self) -> impl Iterator<Item = &EntityTimeline> {
        self.entities.values()
    }

    pub fn timeline(&self, entity_id: i64) -> Option<&EntityTimeline> {
        self.entities.get(&entity_id)
    }

    /// Latest timestamp observed on any signal; open buffs run to this
    /// point for uptime purposes.
    pub fn current_time(&self) -> Option<NaiveDateTime> {
        self.current_time
    }

    pub fn open_count(&self) -> usize {
        self.open_buffs.len()
    }

    /// Drain the derived stack-change events accumulated since the last
    /// call. The session moves these into its cache after every event.
    pub fn take_stack_changes(&mut self) -> Vec<StackChangeEvent> {
        std::mem::take(&mut self.stack_changes)
    }

    /// Total time `status_id` was active, net of invulnerability windows.
    /// See [`query::status_uptime`] for filter semantics.
    pub fn status_uptime<S>(&self, status_id: i64, source: Option<i64>, invulns: &S) -> Duration
    where
        S: InvulnSource + ?Sized,
    {
        let Some(now) = self.current_time else {
            return Duration::zero();
        };
        query::status_uptime(self.entities.values(), status_id, source, invulns, now)
    }

    fn advance_time(&mut self, at: NaiveDateTime) {
        self.current_time = Some(self.current_time.map_or(at, |cur| cur.max(at)));
    }

    fn handle_applied(
        &mut self,
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        at: NaiveDateTime,
        is_debuff: bool,
    ) {
        let Some(entity_id) = self.resolver.resolve(source_id, target_id) else {
            return;
        };
        let key = BuffKey::new(entity_id, ability_id);
        if self.open_buffs.contains_key(&key) {
            tracing::warn!(
                "apply for ability {ability_id} on entity {entity_id} at {at} while an instance is still open; closing it first"
            );
            self.close_open(key, at);
        }

        let timeline = self
            .entities
            .entry(entity_id)
            .or_insert_with(|| EntityTimeline::new(entity_id));
        timeline.buffs.push(Buff::open(ability_id, source_id, at, is_debuff));
        let slot = timeline.buffs.len() - 1;
        self.open_buffs.insert(key, slot);

        self.stack_changes.push(StackChangeEvent {
            ability_id,
            entity_id,
            source_id,
            timestamp: at,
            old_stacks: 0,
            new_stacks: 1,
            stacks_gained: 1,
            is_debuff,
        });
    }

    fn handle_stack(
        &mut self,
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        stacks: u32,
        at: NaiveDateTime,
    ) {
        let Some(entity_id) = self.resolver.resolve(source_id, target_id) else {
            return;
        };
        let key = BuffKey::new(entity_id, ability_id);
        let Some(&slot) = self.open_buffs.get(&key) else {
            // Out-of-order or pre-combat artifact; drop the update.
            tracing::warn!(
                "stack change for ability {ability_id} on entity {entity_id} at {at} has no open instance, dropped"
            );
            return;
        };
        let Some(buff) = self
            .entities
            .get_mut(&entity_id)
            .and_then(|timeline| timeline.buffs.get_mut(slot))
        else {
            return;
        };

        let old_stacks = buff.stacks;
        buff.stacks = stacks;
        buff.stack_history.push(StackEntry { stacks, at });
        let change = StackChangeEvent {
            ability_id,
            entity_id,
            source_id: buff.source_id,
            timestamp: at,
            old_stacks,
            new_stacks: stacks,
            stacks_gained: stacks as i32 - old_stacks as i32,
            is_debuff: buff.is_debuff,
        };
        self.stack_changes.push(change);
    }

    fn handle_removed(
        &mut self,
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        at: NaiveDateTime,
        is_debuff: bool,
    ) {
        let Some(entity_id) = self.resolver.resolve(source_id, target_id) else {
            return;
        };
        let key = BuffKey::new(entity_id, ability_id);
        if !self.open_buffs.contains_key(&key) {
            // Already active when logging began: backfill from encounter
            // start so the instance still contributes to uptime.
            let start = self.encounter_start.unwrap_or(at);
            tracing::warn!(
                "removal for ability {ability_id} on entity {entity_id} at {at} has no open instance; synthesizing one from {start}"
            );
            let timeline = self
                .entities
                .entry(entity_id)
                .or_insert_with(|| EntityTimeline::new(entity_id));
            timeline.buffs.push(Buff::open(ability_id, source_id, start, is_debuff));
            let slot = timeline.buffs.len() - 1;
            self.open_buffs.insert(key, slot);
        }
        self.close_open(key, at);
    }

    /// Close one open buff: stamp the end, append the terminal zero-stack
    /// history entry, and emit the final stack change.
    fn close_open(&mut self, key: BuffKey, at: NaiveDateTime) {
        let Some(slot) = self.open_buffs.remove(&key) else {
            return;
        };
        let Some(buff) = self
            .entities
            .get_mut(&key.entity_id)
            .and_then(|timeline| timeline.buffs.get_mut(slot))
        else {
            return;
        };

        let old_stacks = buff.stacks;
        buff.stacks = 0;
        buff.removed_at = Some(at);
        buff.stack_history.push(StackEntry { stacks: 0, at });
        let change = StackChangeEvent {
            ability_id: buff.ability_id,
            entity_id: key.entity_id,
            source_id: buff.source_id,
            timestamp: at,
            old_stacks,
            new_stacks: 0,
            stacks_gained: -(old_stacks as i32),
            is_debuff: buff.is_debuff,
        };
        self.stack_changes.push(change);
    }

    /// Close every open buff at `at`, in (entity, ability) order so the
    /// emitted stream is deterministic. Called on encounter end.
    fn close_all_open(&mut self, at: NaiveDateTime) {
        let mut keys: Vec<BuffKey> = self.open_buffs.keys().copied().collect();
        keys.sort_by_key(|key| (key.entity_id, key.ability_id));
        for key in keys {
            self.close_open(key, at);
        }
    }
}

impl<R: EntityResolver> SignalHandler for BuffTracker<R> {
    fn handle_signal(&mut self, signal: &AnalysisSignal) {
        self.advance_time(signal.timestamp());
        match signal {
            AnalysisSignal::EncounterStarted { timestamp } => {
                self.encounter_start = Some(*timestamp);
            }
            AnalysisSignal::StatusApplied {
                ability_id,
                source_id,
                target_id,
                timestamp,
                is_debuff,
            } => {
                self.handle_applied(*ability_id, *source_id, *target_id, *timestamp, *is_debuff);
            }
            AnalysisSignal::StackAdjusted {
                ability_id,
                source_id,
                target_id,
                stacks,
                timestamp,
                ..
            } => {
                self.handle_stack(*ability_id, *source_id, *target_id, *stacks, *timestamp);
            }
            AnalysisSignal::StatusRemoved {
                ability_id,
                source_id,
                target_id,
                timestamp,
                is_debuff,
            } => {
                self.handle_removed(*ability_id, *source_id, *target_id, *timestamp, *is_debuff);
            }
            AnalysisSignal::EncounterEnded { timestamp } => {
                self.close_all_open(*timestamp);
            }
            AnalysisSignal::CastRecorded { .. } => {}
        }
    }
}
