pub mod buffs;
pub mod events;
pub mod invulns;
pub mod profile;
pub mod query;
pub mod rotation;
pub mod session;
pub mod signal_processor;

// Re-exports for convenience
pub use events::{AnalysisSignal, CombatEvent, EventKind, SignalHandler};
pub use session::{AnalysisSession, SessionCache};
pub use signal_processor::EventProcessor;
