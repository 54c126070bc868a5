use chrono::{DateTime, Utc};
use tracing::debug;

use crate::tracker::IssueTracker;
use crate::types::{Issue, IssueSummary, IssueWorkflow, Project, Transition};

/// A tracker stand-in used when no credentials are configured
/// (Configuration-missing, §7): every operation is a no-op that logs and
/// returns its fail-soft value without attempting any network I/O.
#[derive(Debug, Default)]
pub struct NullTracker;

impl IssueTracker for NullTracker {
    fn connect(&self) -> bool {
        debug!(event = "tracker.null.connect_skipped", reason = "not_configured");
        false
    }

    fn is_connected(&self) -> bool {
        false
    }

    fn get_issue(&self, _key: &str) -> Option<Issue> {
        None
    }

    fn add_worklog(
        &self,
        _key: &str,
        _time_spent: &str,
        _comment: &str,
        _started: Option<DateTime<Utc>>,
    ) -> Option<String> {
        None
    }

    fn add_comment(&self, _key: &str, _body: &str) -> bool {
        false
    }

    fn search(&self, _jql: &str, _max_results: u32) -> Vec<IssueSummary> {
        Vec::new()
    }

    fn my_issues(&self, _status_filter: Option<&str>) -> Vec<IssueSummary> {
        Vec::new()
    }

    fn list_transitions(&self, _key: &str) -> Vec<Transition> {
        Vec::new()
    }

    fn transition(&self, _key: &str, _target_status_name: &str) -> bool {
        false
    }

    fn list_projects(&self) -> Vec<Project> {
        Vec::new()
    }

    fn list_project_statuses(&self, _project_key: &str) -> Vec<String> {
        Vec::new()
    }

    fn list_all_statuses(&self) -> Vec<String> {
        Vec::new()
    }

    fn issue_workflow(&self, _key: &str) -> Option<IssueWorkflow> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_operation_is_a_fail_soft_noop() {
        let tracker = NullTracker;
        assert!(!tracker.connect());
        assert!(!tracker.is_connected());
        assert_eq!(tracker.get_issue("PROJ-1"), None);
        assert_eq!(tracker.add_worklog("PROJ-1", "1h", "x", None), None);
        assert!(!tracker.add_comment("PROJ-1", "x"));
        assert!(tracker.search("x", 10).is_empty());
        assert!(!tracker.transition("PROJ-1", "Done"));
    }
}
