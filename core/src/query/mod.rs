//! Queries over tracked encounter state.
//!
//! Everything here runs after ingestion against the trackers' arenas:
//! - **uptime**: interval union with invulnerability subtraction
//! - **stats**: applications, max stacks, stack-weighted uptime

pub mod stats;
pub mod uptime;


pub use stats::{StatusStats, status_stats};
pub use uptime::status_uptime;
