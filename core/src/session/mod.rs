//! Per-encounter session state and the analysis pipeline.

pub mod cache;
pub mod pipeline;

pub use cache::{ActorState, EncounterInfo, EncounterPhase, SessionCache};
pub use pipeline::{AnalysisSession, IngestError};
