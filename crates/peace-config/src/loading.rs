use serde_json::{Map, Value, json};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::errors::ConfigError;
use crate::types::DevPeaceConfig;

const EVENT_NAMES: &[&str] = &["on_work_start", "on_first_commit", "on_work_complete"];

/// Load configuration from `path`, creating it with defaults if missing.
///
/// A legacy `rules`-shaped `status_automation` document (keyed by
/// `rules.<event>.{enabled,from_status,to_status}`) is converted to the
/// authoritative `events`-shaped document on the fly; the legacy shape is
/// never written back.
pub fn load_or_init(path: &Path) -> Result<DevPeaceConfig, ConfigError> {
    if !path.exists() {
        let config = DevPeaceConfig::default();
        save(path, &config)?;
        info!(event = "config.load_init_created", path = %path.display());
        return Ok(config);
    }

    let raw = fs::read_to_string(path)?;
    let mut value: Value = serde_json::from_str(&raw).map_err(|source| ConfigError::ParseError {
        path: path.display().to_string(),
        source,
    })?;

    normalize_status_automation(&mut value);

    let config = serde_json::from_value(value).map_err(|source| ConfigError::ParseError {
        path: path.display().to_string(),
        source,
    })?;

    debug!(event = "config.load_completed", path = %path.display());
    Ok(config)
}

/// Save configuration to `path`, writing atomically (temp file + rename).
pub fn save(path: &Path, config: &DevPeaceConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(|source| ConfigError::ParseError {
        path: path.display().to_string(),
        source,
    })?;

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, &json)?;
    fs::rename(&temp_path, path)?;

    debug!(event = "config.save_completed", path = %path.display());
    Ok(())
}

/// Rewrite a legacy `rules`-shaped `status_automation` document into the
/// authoritative `events` shape, in place. A no-op if `status_automation` is
/// absent, already `events`-shaped, or not an object.
fn normalize_status_automation(root: &mut Value) {
    let Some(automation) = root.get_mut("status_automation").and_then(Value::as_object_mut) else {
        return;
    };

    if automation.contains_key("events") {
        return;
    }

    let Some(rules) = automation.remove("rules").and_then(|v| match v {
        Value::Object(map) => Some(map),
        _ => None,
    }) else {
        return;
    };

    warn!(event = "config.status_automation.legacy_shape_converted");

    let mut events = Map::new();
    for event_name in EVENT_NAMES {
        let Some(rule) = rules.get(*event_name).and_then(Value::as_object) else {
            continue;
        };

        let enabled = rule.get("enabled").and_then(Value::as_bool).unwrap_or(false);
        if !enabled {
            events.insert((*event_name).to_string(), Value::Array(vec![]));
            continue;
        }

        let Some(to_status) = rule.get("to_status").and_then(Value::as_str) else {
            events.insert((*event_name).to_string(), Value::Array(vec![]));
            continue;
        };

        let from = rule
            .get("from_status")
            .cloned()
            .unwrap_or(Value::Array(vec![]));

        events.insert(
            (*event_name).to_string(),
            Value::Array(vec![json!({ "from": from, "to": to_status })]),
        );
    }

    automation.insert("events".to_string(), Value::Object(events));
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creates_default_config_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = load_or_init(&path).unwrap();
        assert!(path.exists());
        assert!(config.auto_worklog);
    }

    #[test]
    fn round_trips_saved_config() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut config = DevPeaceConfig::default();
        config.jira_url = "https://example.atlassian.net".to_string();
        save(&path, &config).unwrap();

        let loaded = load_or_init(&path).unwrap();
        assert_eq!(loaded.jira_url, "https://example.atlassian.net");
    }

    #[test]
    fn converts_legacy_rules_shape() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let legacy = json!({
            "status_automation": {
                "enabled": true,
                "auto_revert_on_session_end": false,
                "rules": {
                    "on_work_start": {
                        "enabled": true,
                        "from_status": ["To Do", "Open"],
                        "to_status": "In Progress"
                    },
                    "on_first_commit": {
                        "enabled": false,
                        "from_status": ["To Do"],
                        "to_status": "In Progress"
                    },
                    "on_work_complete": {
                        "enabled": true,
                        "from_status": "In Progress",
                        "to_status": "Done"
                    }
                }
            }
        });
        fs::write(&path, serde_json::to_string(&legacy).unwrap()).unwrap();

        let config = load_or_init(&path).unwrap();
        assert!(config.status_automation.enabled);

        let start_rules = config
            .status_automation
            .events
            .get("on_work_start")
            .unwrap();
        assert_eq!(start_rules.len(), 1);
        assert_eq!(start_rules[0].to, "In Progress");
        assert!(start_rules[0].from.matches("Open"));

        let first_commit_rules = config
            .status_automation
            .events
            .get("on_first_commit")
            .unwrap();
        assert!(first_commit_rules.is_empty());

        let complete_rules = config
            .status_automation
            .events
            .get("on_work_complete")
            .unwrap();
        assert_eq!(complete_rules.len(), 1);
        assert!(complete_rules[0].from.matches("In Progress"));
    }

    #[test]
    fn events_shape_is_passed_through_unchanged() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        let authoritative = json!({
            "status_automation": {
                "enabled": true,
                "auto_revert_on_session_end": true,
                "events": {
                    "on_work_start": [{"from": ["To Do"], "to": "In Progress"}]
                }
            }
        });
        fs::write(&path, serde_json::to_string(&authoritative).unwrap()).unwrap();

        let config = load_or_init(&path).unwrap();
        assert!(config.status_automation.auto_revert_on_session_end);
        let rules = config
            .status_automation
            .events
            .get("on_work_start")
            .unwrap();
        assert_eq!(rules[0].to, "In Progress");
    }
}
