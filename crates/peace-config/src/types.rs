//! Configuration type definitions for dev-peace.
//!
//! These types are serialized/deserialized from the JSON config file at
//! `${config_dir}/config.json`.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `from` in a transition rule — either a single status name or a list of
/// status names, any of which matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum FromSpec {
    Single(String),
    Any(Vec<String>),
}

impl FromSpec {
    /// Whether `status` satisfies this `from` spec.
    pub fn matches(&self, status: &str) -> bool {
        match self {
            FromSpec::Single(expected) => expected == status,
            FromSpec::Any(candidates) => candidates.iter().any(|c| c == status),
        }
    }
}

/// One ordered rule: if the issue's current status matches `from`, transition
/// it to `to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionRule {
    pub from: FromSpec,
    pub to: String,
}

/// The three automation events the rules engine can be asked to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusEvent {
    OnWorkStart,
    OnFirstCommit,
    OnWorkComplete,
}

impl StatusEvent {
    pub fn key(&self) -> &'static str {
        match self {
            StatusEvent::OnWorkStart => "on_work_start",
            StatusEvent::OnFirstCommit => "on_first_commit",
            StatusEvent::OnWorkComplete => "on_work_complete",
        }
    }
}

/// Status-automation configuration: the `events`-shaped document is
/// authoritative. A legacy `rules`-shaped document is accepted when loading
/// from disk (see `loading::normalize_status_automation`) and converted into
/// this shape; this type is never serialized back into the legacy shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusAutomationConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub auto_revert_on_session_end: bool,
    #[serde(default)]
    pub events: HashMap<String, Vec<TransitionRule>>,
}

impl StatusAutomationConfig {
    pub fn rules_for(&self, event: StatusEvent) -> &[TransitionRule] {
        self.events
            .get(event.key())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// Filesystem-watch behavior.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitoringConfig {
    #[serde(default = "default_true")]
    pub recursive: bool,
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            recursive: true,
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "*.tmp".to_string(),
        "*.log".to_string(),
        ".DS_Store".to_string(),
        "node_modules/*".to_string(),
        ".venv/*".to_string(),
        "__pycache__/*".to_string(),
    ]
}

fn default_min_session_minutes() -> u32 {
    5
}

fn default_commit_comment_threshold() -> usize {
    1
}

fn default_worklog_description_template() -> String {
    "Development — session recorded automatically".to_string()
}

/// Top-level configuration, loaded from `${config_dir}/config.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DevPeaceConfig {
    #[serde(default)]
    pub jira_url: String,
    #[serde(default)]
    pub jira_user: String,
    #[serde(default)]
    pub jira_token: String,

    #[serde(default = "default_true")]
    pub auto_worklog: bool,

    #[serde(default = "default_min_session_minutes")]
    pub min_session_minutes: u32,

    #[serde(default = "default_commit_comment_threshold")]
    pub commit_comment_threshold: usize,

    #[serde(default = "default_worklog_description_template")]
    pub worklog_description_template: String,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub status_automation: StatusAutomationConfig,
}

impl Default for DevPeaceConfig {
    fn default() -> Self {
        Self {
            jira_url: String::new(),
            jira_user: String::new(),
            jira_token: String::new(),
            auto_worklog: true,
            min_session_minutes: default_min_session_minutes(),
            commit_comment_threshold: default_commit_comment_threshold(),
            worklog_description_template: default_worklog_description_template(),
            monitoring: MonitoringConfig::default(),
            status_automation: StatusAutomationConfig::default(),
        }
    }
}

impl DevPeaceConfig {
    /// Whether enough credentials are present to attempt a tracker connection.
    pub fn has_jira_credentials(&self) -> bool {
        !self.jira_url.is_empty() && !self.jira_user.is_empty() && !self.jira_token.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_spec_single_matches_only_itself() {
        let spec = FromSpec::Single("To Do".to_string());
        assert!(spec.matches("To Do"));
        assert!(!spec.matches("Open"));
    }

    #[test]
    fn from_spec_any_matches_any_member() {
        let spec = FromSpec::Any(vec!["To Do".to_string(), "Open".to_string()]);
        assert!(spec.matches("Open"));
        assert!(!spec.matches("Done"));
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = DevPeaceConfig::default();
        assert!(config.auto_worklog);
        assert_eq!(config.min_session_minutes, 5);
        assert_eq!(config.commit_comment_threshold, 1);
        assert!(!config.has_jira_credentials());
    }
}
