//! Raw log events and the derived signal stream.
//!
//! ```text
//! JSON line ──serde──► CombatEvent ──EventProcessor──► Vec<AnalysisSignal>
//!                                                            │
//!                                              SignalHandler implementors
//!                                      (buff tracker, invuln tracker, ...)
//! ```

pub mod handler;
pub mod record;
pub mod signal;

pub use handler::SignalHandler;
pub use record::{AbilityRef, CombatEvent, EventKind, ResourceSnapshot};
pub use signal::AnalysisSignal;
