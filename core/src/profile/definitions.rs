//! Analysis profile definition types
//!
//! Definitions are templates loaded from TOML config files that describe
//! which statuses to track, which statuses grant immunity, and which
//! rotation windows to classify.

use serde::{Deserialize, Serialize};

use crate::invulns::InvulnKind;

/// A status effect to track and report uptime for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDefinition {
    /// Ability guid the log uses for this status
    pub id: i64,

    /// Display name shown in reports
    pub name: String,

    /// Whether this is a debuff on enemies rather than a self buff
    #[serde(default)]
    pub debuff: bool,

    /// Whether this definition is currently enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A status that marks its holder immune
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvulnDefinition {
    /// Ability guid the log uses for this status
    pub id: i64,

    /// Display name shown in reports
    pub name: String,

    /// Whether the immunity halts effects (`invulnerable`) or only
    /// prevents damage (`invincible`)
    pub kind: InvulnKind,

    /// Whether this definition is currently enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// A rotation window to classify
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowRule {
    /// Unique rule name; later files override earlier ones by name
    pub name: String,

    // ─── Window shape ────────────────────────────────────────────────────────
    /// Cast that opens the window
    pub opener_id: i64,

    /// Status granted by the opener; its removal closes the window
    pub status_id: i64,

    /// Cast counted toward the expected total while the window is open
    pub qualifying_id: i64,

    /// Qualifying casts expected per window
    pub expected_count: u32,

    // ─── Resource gate ───────────────────────────────────────────────────────
    /// Minimum resource fraction (0.0 to 1.0) required to open
    pub resource_floor: f64,

    /// Flat resource amount forgiven on top of the snapshot, covering
    /// regeneration since the snapshot was taken
    #[serde(default)]
    pub tick_allowance: u32,

    // ─── Filtering ───────────────────────────────────────────────────────────
    /// Casts excluded from window membership and from transitions
    #[serde(default)]
    pub ignored_ids: Vec<i64>,

    /// Whether this rule is currently enabled
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// One parsed profile document; several merge into an
/// [`AnalysisProfile`](super::AnalysisProfile)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileConfig {
    /// Statuses to report uptime for
    #[serde(default, rename = "status")]
    pub statuses: Vec<StatusDefinition>,

    /// Immunity statuses
    #[serde(default, rename = "invuln")]
    pub invulns: Vec<InvulnDefinition>,

    /// Rotation window rules
    #[serde(default, rename = "window")]
    pub windows: Vec<WindowRule>,
}

impl ProfileConfig {
    /// Non-fatal consistency notes for `check-profile`; a document with
    /// notes still loads.
    pub fn lint(&self) -> Vec<String> {
        let mut notes = Vec::new();
        for rule in &self.windows {
            if !(0.0..=1.0).contains(&rule.resource_floor) {
                notes.push(format!(
                    "window {}: resource_floor {} outside 0.0..=1.0",
                    rule.name, rule.resource_floor
                ));
            }
            if rule.expected_count == 0 {
                notes.push(format!(
                    "window {}: expected_count of 0 can never miss actions",
                    rule.name
                ));
            }
            if rule.opener_id == rule.qualifying_id {
                notes.push(format!(
                    "window {}: opener_id and qualifying_id are the same ability",
                    rule.name
                ));
            }
        }
        notes
    }
}

fn default_true() -> bool {
    true
}
