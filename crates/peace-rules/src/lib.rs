//! Status-automation rules engine for dev-peace.
//!
//! Evaluates a configured [`StatusAutomationConfig`] against a tracker's
//! live issue status and decides which transition, if any, an event should
//! trigger. Pure decision logic plus the single tracker round-trip each
//! operation needs — no persistence, no session-state knowledge.

use peace_config::{StatusAutomationConfig, StatusEvent};
use peace_tracker::IssueTracker;
use tracing::{debug, warn};

/// Evaluate `event` for `issue_key` against `config`, transitioning the
/// issue if a rule matches the issue's current remote status.
///
/// Returns the status transitioned to on success. Returns `None` (not an
/// error) when automation is disabled, the issue's current status can't be
/// fetched, no rule's `from` matches, or the tracker rejects the transition.
pub fn evaluate(
    config: &StatusAutomationConfig,
    tracker: &dyn IssueTracker,
    event: StatusEvent,
    issue_key: &str,
) -> Option<String> {
    if !config.enabled {
        debug!(event = "rules.evaluate_skipped", reason = "disabled", issue = %issue_key);
        return None;
    }

    let issue = tracker.get_issue(issue_key).or_else(|| {
        warn!(event = "rules.evaluate_skipped", reason = "issue_unreadable", issue = %issue_key);
        None
    })?;

    let target = select_target(config, event, &issue.status).or_else(|| {
        debug!(
            event = "rules.evaluate_no_match",
            issue = %issue_key,
            current_status = %issue.status,
            rule_event = event.key()
        );
        None
    })?;

    if tracker.transition(issue_key, &target) {
        debug!(event = "rules.evaluate_transitioned", issue = %issue_key, target = %target);
        Some(target)
    } else {
        warn!(event = "rules.evaluate_transition_failed", issue = %issue_key, target = %target);
        None
    }
}

/// Attempt to revert `issue_key` back to `original_status` at session end.
///
/// A no-op success if automation or auto-revert is disabled, or if the
/// issue's current status already equals `original_status` — the tracker
/// is never called in that case.
pub fn on_session_end(
    config: &StatusAutomationConfig,
    tracker: &dyn IssueTracker,
    issue_key: &str,
    original_status: &str,
) -> bool {
    if !config.enabled || !config.auto_revert_on_session_end {
        return false;
    }

    let Some(issue) = tracker.get_issue(issue_key) else {
        warn!(event = "rules.auto_revert_skipped", reason = "issue_unreadable", issue = %issue_key);
        return false;
    };

    if issue.status == original_status {
        debug!(event = "rules.auto_revert_noop", issue = %issue_key, status = %original_status);
        return true;
    }

    let ok = tracker.transition(issue_key, original_status);
    if ok {
        debug!(event = "rules.auto_revert_completed", issue = %issue_key, target = %original_status);
    } else {
        warn!(event = "rules.auto_revert_failed", issue = %issue_key, target = %original_status);
    }
    ok
}

/// Walk the rules configured for `event` in order, returning the `to` of
/// the first rule whose `from` matches `current_status`.
fn select_target(
    config: &StatusAutomationConfig,
    event: StatusEvent,
    current_status: &str,
) -> Option<String> {
    config
        .rules_for(event)
        .iter()
        .find(|rule| rule.from.matches(current_status))
        .map(|rule| rule.to.clone())
}
