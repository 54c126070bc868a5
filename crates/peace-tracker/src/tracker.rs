use chrono::{DateTime, Utc};

use crate::types::{Issue, IssueSummary, IssueWorkflow, Project, Transition};

/// A typed façade over a remote issue tracker.
///
/// Every operation is fail-soft: on any failure (network, auth, not found)
/// implementations log and return the empty/null/false value rather than
/// propagating an error — callers in the session manager and rules engine
/// never need to handle a tracker `Err`.
pub trait IssueTracker: Send + Sync {
    /// Basic-auth handshake; stores authentication status for `is_connected`.
    fn connect(&self) -> bool;

    fn is_connected(&self) -> bool;

    fn get_issue(&self, key: &str) -> Option<Issue>;

    fn issue_exists(&self, key: &str) -> bool {
        self.get_issue(key).is_some()
    }

    fn add_worklog(
        &self,
        key: &str,
        time_spent: &str,
        comment: &str,
        started: Option<DateTime<Utc>>,
    ) -> Option<String>;

    fn add_comment(&self, key: &str, body: &str) -> bool;

    fn search(&self, jql: &str, max_results: u32) -> Vec<IssueSummary>;

    fn my_issues(&self, status_filter: Option<&str>) -> Vec<IssueSummary>;

    fn list_transitions(&self, key: &str) -> Vec<Transition>;

    /// Find the transition whose `to_status` equals `target_status_name`
    /// case-insensitively and execute it.
    fn transition(&self, key: &str, target_status_name: &str) -> bool;

    fn list_projects(&self) -> Vec<Project>;

    fn list_project_statuses(&self, project_key: &str) -> Vec<String>;

    fn list_all_statuses(&self) -> Vec<String>;

    fn issue_workflow(&self, key: &str) -> Option<IssueWorkflow>;
}
