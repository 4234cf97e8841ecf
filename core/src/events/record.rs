//! Raw combat-log records, one JSON object per line.

use chrono::NaiveDateTime;
use serde::Deserialize;

/// Log event kind. Unrecognized values fall through to `Unknown` so an
/// export carrying event types this engine does not consume (damage, heals)
/// still ingests cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    ApplyBuff,
    ApplyDebuff,
    ApplyBuffStack,
    ApplyDebuffStack,
    RemoveBuffStack,
    RemoveDebuffStack,
    RemoveBuff,
    RemoveDebuff,
    Cast,
    Complete,
    #[serde(other)]
    Unknown,
}

impl EventKind {
    /// Kinds that operate on a debuff rather than a buff.
    pub fn is_debuff(self) -> bool {
        matches!(
            self,
            EventKind::ApplyDebuff
                | EventKind::ApplyDebuffStack
                | EventKind::RemoveDebuffStack
                | EventKind::RemoveDebuff
        )
    }
}

/// Opaque ability/status reference. The engine never interprets the guid;
/// names come from the analysis profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct AbilityRef {
    pub guid: i64,
}

/// Resource pool snapshot (e.g. mana) carried on events that report it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ResourceSnapshot {
    pub current: u32,
    pub maximum: u32,
}

/// One raw log event. Field names follow the log export format; the engine
/// never consumes these directly, the signal processor turns them into
/// [`AnalysisSignal`](super::AnalysisSignal)s first.
#[derive(Debug, Clone, Deserialize)]
pub struct CombatEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub timestamp: NaiveDateTime,
    /// Absent on bookkeeping events such as `complete`.
    #[serde(default)]
    pub ability: Option<AbilityRef>,
    #[serde(rename = "sourceID", default)]
    pub source_id: Option<i64>,
    #[serde(rename = "targetID", default)]
    pub target_id: Option<i64>,
    /// New absolute stack count on stack-change events.
    #[serde(default)]
    pub stack: Option<u32>,
    /// Source resource pool at event time, when the log carries it.
    #[serde(rename = "sourceResources", default)]
    pub source_resources: Option<ResourceSnapshot>,
}
