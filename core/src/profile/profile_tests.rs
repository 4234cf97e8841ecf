//! Tests for profile parsing and merging

use super::definitions::{ProfileConfig, StatusDefinition, WindowRule};
use super::loader::AnalysisProfile;
use crate::invulns::InvulnKind;

const FULL_DOC: &str = r#"
[[status]]
id = 7001
name = "Corruption"
debuff = true

[[status]]
id = 4300
name = "Zeal"

[[invuln]]
id = 8000
name = "Phase Shield"
kind = "invulnerable"

[[window]]
name = "burst"
opener_id = 100
status_id = 900
qualifying_id = 200
expected_count = 5
resource_floor = 0.8
"#;

fn status(id: i64, enabled: bool) -> StatusDefinition {
    StatusDefinition {
        id,
        name: format!("status-{id}"),
        debuff: false,
        enabled,
    }
}

fn window(name: &str, expected_count: u32) -> WindowRule {
    WindowRule {
        name: name.to_string(),
        opener_id: 100,
        status_id: 900,
        qualifying_id: 200,
        expected_count,
        resource_floor: 0.8,
        tick_allowance: 0,
        ignored_ids: Vec::new(),
        enabled: true,
    }
}

#[test]
fn test_parses_full_document() {
    let config: ProfileConfig = toml::from_str(FULL_DOC).unwrap();

    assert_eq!(config.statuses.len(), 2);
    assert!(config.statuses[0].debuff);
    assert!(config.statuses[0].enabled);
    assert!(!config.statuses[1].debuff);

    assert_eq!(config.invulns.len(), 1);
    assert_eq!(config.invulns[0].kind, InvulnKind::Invulnerable);

    assert_eq!(config.windows.len(), 1);
    let rule = &config.windows[0];
    assert_eq!(rule.expected_count, 5);
    assert_eq!(rule.tick_allowance, 0);
    assert!(rule.ignored_ids.is_empty());
    assert!(rule.enabled);
}

#[test]
fn test_empty_document_parses() {
    let config: ProfileConfig = toml::from_str("").unwrap();
    assert_eq!(config, ProfileConfig::default());
}

#[test]
fn test_add_config_reports_duplicates() {
    let mut profile = AnalysisProfile::new();
    let first = ProfileConfig {
        statuses: vec![status(7001, true)],
        ..Default::default()
    };
    let second = ProfileConfig {
        statuses: vec![status(7001, true)],
        ..Default::default()
    };

    assert!(profile.add_config(first).is_empty());
    let duplicates = profile.add_config(second);
    assert_eq!(duplicates, vec!["status 7001".to_string()]);
    assert_eq!(profile.statuses.len(), 1);
}

#[test]
fn test_window_override_replaces_by_name() {
    let mut profile = AnalysisProfile::new();
    profile.add_config(ProfileConfig {
        windows: vec![window("burst", 5)],
        ..Default::default()
    });
    let duplicates = profile.add_config(ProfileConfig {
        windows: vec![window("burst", 7)],
        ..Default::default()
    });

    assert_eq!(duplicates, vec!["window burst".to_string()]);
    assert_eq!(profile.windows.len(), 1);
    assert_eq!(profile.windows[0].expected_count, 7);
}

#[test]
fn test_enabled_filters_apply() {
    let mut profile = AnalysisProfile::new();
    profile.add_config(ProfileConfig {
        statuses: vec![status(1, true), status(2, false)],
        ..Default::default()
    });

    let enabled: Vec<i64> = profile.enabled_statuses().map(|def| def.id).collect();
    assert_eq!(enabled, vec![1]);
}

#[test]
fn test_lint_flags_bad_rules() {
    let mut rule = window("bad", 0);
    rule.resource_floor = 1.5;
    rule.qualifying_id = rule.opener_id;
    let config = ProfileConfig {
        windows: vec![rule],
        ..Default::default()
    };

    let notes = config.lint();
    assert_eq!(notes.len(), 3);
}
