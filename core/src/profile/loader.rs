//! Profile loading and merging
//!
//! Profiles come from TOML files in two places:
//! - **User library**: Shared definitions under the platform config dir
//! - **Explicit profile**: The file passed on the command line
//!
//! The library loads first; the explicit profile merges last and
//! overrides library entries with the same identity.

use std::fs;
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;

use super::definitions::{InvulnDefinition, ProfileConfig, StatusDefinition, WindowRule};
use crate::invulns::InvulnKind;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("reading profile {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Merged set of definitions driving one analysis run
#[derive(Debug, Clone, Default)]
pub struct AnalysisProfile {
    /// Statuses to report, keyed by ability guid
    pub statuses: HashMap<i64, StatusDefinition>,

    /// Immunity statuses, keyed by ability guid
    pub invulns: HashMap<i64, InvulnDefinition>,

    /// Window rules in merge order
    pub windows: Vec<WindowRule>,
}

impl AnalysisProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a parsed document in, returning descriptions of entries it
    /// overrode. Statuses and invulns replace by id, windows by name.
    pub fn add_config(&mut self, config: ProfileConfig) -> Vec<String> {
        let mut duplicates = Vec::new();

        for status in config.statuses {
            if self.statuses.contains_key(&status.id) {
                duplicates.push(format!("status {}", status.id));
            }
            self.statuses.insert(status.id, status);
        }

        for invuln in config.invulns {
            if self.invulns.contains_key(&invuln.id) {
                duplicates.push(format!("invuln {}", invuln.id));
            }
            self.invulns.insert(invuln.id, invuln);
        }

        for window in config.windows {
            if self.windows.iter().any(|rule| rule.name == window.name) {
                duplicates.push(format!("window {}", window.name));
                self.windows.retain(|rule| rule.name != window.name);
            }
            self.windows.push(window);
        }

        duplicates
    }

    pub fn enabled_statuses(&self) -> impl Iterator<Item = &StatusDefinition> {
        self.statuses.values().filter(|def| def.enabled)
    }

    pub fn enabled_windows(&self) -> impl Iterator<Item = &WindowRule> {
        self.windows.iter().filter(|rule| rule.enabled)
    }

    /// Watch list for the invulnerability tracker.
    pub fn invuln_watch(&self) -> impl Iterator<Item = (i64, InvulnKind)> + '_ {
        self.invulns
            .values()
            .filter(|def| def.enabled)
            .map(|def| (def.id, def.kind))
    }
}

/// Load the profile at `path`, layered over the user library.
pub fn load_profile(path: &Path) -> Result<AnalysisProfile, ProfileError> {
    let mut profile = AnalysisProfile::new();

    if let Some(dir) = user_profile_dir()
        && dir.exists()
    {
        merge_directory(&mut profile, &dir)?;
    }
    merge_file(&mut profile, path)?;

    Ok(profile)
}

/// Parse a single TOML profile document
pub fn read_config(path: &Path) -> Result<ProfileConfig, ProfileError> {
    let contents = fs::read_to_string(path).map_err(|e| ProfileError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&contents).map_err(|e| ProfileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// The user's shared profile library
pub fn user_profile_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vigil").join("profiles"))
}

/// Merge every TOML file in `dir`, in name order so layering is stable.
/// A file that fails to parse is skipped, not fatal.
fn merge_directory(profile: &mut AnalysisProfile, dir: &Path) -> Result<(), ProfileError> {
    let entries = fs::read_dir(dir).map_err(|e| ProfileError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "toml"))
        .collect();
    paths.sort();

    for path in paths {
        if let Err(e) = merge_file(profile, &path) {
            tracing::warn!("skipping profile {}: {e}", path.display());
        }
    }

    Ok(())
}

fn merge_file(profile: &mut AnalysisProfile, path: &Path) -> Result<(), ProfileError> {
    let config = read_config(path)?;
    let duplicates = profile.add_config(config);
    if !duplicates.is_empty() {
        tracing::warn!(
            "profile {} overrides earlier definitions: {}",
            path.display(),
            duplicates.join(", ")
        );
    }
    Ok(())
}
