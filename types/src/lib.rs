//! Shared types for the Vigil encounter analyzer.
//!
//! Report rows produced by `vigil-core` and consumed by the CLI (or any
//! other front end). Kept dependency-light so consumers don't pull in the
//! whole engine.

pub mod formatting;
pub mod report;

pub use report::{EncounterMeta, EncounterReport, RuleTally, StatusUptimeRow, WindowReport};
