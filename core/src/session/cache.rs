use chrono::NaiveDateTime;
use hashbrown::HashMap;

use crate::buffs::StackChangeEvent;
use crate::events::ResourceSnapshot;

/// Encounter phase, advanced by the event processor.
///
/// A log describes exactly one encounter: the first recognized event moves
/// the phase to `Running`, the `complete` marker to `Completed`. Nothing
/// moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncounterPhase {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Wall-clock bounds and ingestion bookkeeping for the encounter.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncounterInfo {
    pub started_at: Option<NaiveDateTime>,
    pub ended_at: Option<NaiveDateTime>,
    pub events_processed: u64,
    /// Unrecognized kinds plus events arriving after completion.
    pub events_ignored: u64,
}

/// Last known combatant state, updated from events that carry it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActorState {
    pub resources: Option<ResourceSnapshot>,
    pub last_seen: Option<NaiveDateTime>,
}

/// Mutable state shared across one ingestion pass.
///
/// The processor updates it while deriving signals; the session appends the
/// tracker's drained stack-change stream here after every event so
/// downstream consumers read derived events from one place instead of the
/// input channel.
#[derive(Debug, Default)]
pub struct SessionCache {
    pub phase: EncounterPhase,
    pub encounter: EncounterInfo,
    pub actors: HashMap<i64, ActorState>,
    pub stack_changes: Vec<StackChangeEvent>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest cached resource snapshot for an actor.
    pub fn actor_resources(&self, actor_id: i64) -> Option<ResourceSnapshot> {
        self.actors.get(&actor_id).and_then(|a| a.resources)
    }

    /// Record that an actor was seen, keeping its newest resource snapshot.
    pub fn note_actor(
        &mut self,
        actor_id: i64,
        at: NaiveDateTime,
        resources: Option<ResourceSnapshot>,
    ) {
        let state = self.actors.entry(actor_id).or_default();
        state.last_seen = Some(at);
        if resources.is_some() {
            state.resources = resources;
        }
    }
}
