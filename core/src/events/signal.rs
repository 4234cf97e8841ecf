use chrono::NaiveDateTime;

use super::record::ResourceSnapshot;

/// Signals derived from raw log events by the `EventProcessor`.
///
/// These represent "interesting things that happened" at a higher level
/// than raw log records. Every downstream consumer (buff tracker,
/// invulnerability tracker, window classifiers) works exclusively from this
/// stream; each signal carries everything its consumers need so no handler
/// reaches back into the processor mid-pass.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisSignal {
    // Encounter lifecycle
    EncounterStarted {
        timestamp: NaiveDateTime,
    },
    EncounterEnded {
        timestamp: NaiveDateTime,
    },

    // Status-effect lifecycle
    StatusApplied {
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        timestamp: NaiveDateTime,
        is_debuff: bool,
    },
    StackAdjusted {
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        /// New absolute stack count.
        stacks: u32,
        timestamp: NaiveDateTime,
        is_debuff: bool,
    },
    StatusRemoved {
        ability_id: i64,
        source_id: Option<i64>,
        target_id: i64,
        timestamp: NaiveDateTime,
        is_debuff: bool,
    },

    // Ability activation (rotation windows)
    CastRecorded {
        ability_id: i64,
        source_id: i64,
        target_id: Option<i64>,
        timestamp: NaiveDateTime,
        /// Latest known resource pool of the caster.
        resources: Option<ResourceSnapshot>,
    },
}

impl AnalysisSignal {
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            AnalysisSignal::EncounterStarted { timestamp }
            | AnalysisSignal::EncounterEnded { timestamp }
            | AnalysisSignal::StatusApplied { timestamp, .. }
            | AnalysisSignal::StackAdjusted { timestamp, .. }
            | AnalysisSignal::StatusRemoved { timestamp, .. }
            | AnalysisSignal::CastRecorded { timestamp, .. } => *timestamp,
        }
    }
}
