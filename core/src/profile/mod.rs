//! Analysis profiles
//!
//! A profile tells the engine what to look for: statuses worth reporting,
//! statuses that grant immunity, and rotation windows to classify. The
//! engine itself never hardcodes ability guids.

mod definitions;
mod loader;

#[cfg(test)]
mod profile_tests;

pub use definitions::{InvulnDefinition, ProfileConfig, StatusDefinition, WindowRule};
pub use loader::{AnalysisProfile, ProfileError, load_profile, read_config, user_profile_dir};
