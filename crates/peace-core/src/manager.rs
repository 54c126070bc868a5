//! The session lifecycle engine: the single consumer of classified activity
//! events, owning all session state and enforcing the one-active-session-
//! per-repository invariant.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use peace_config::{DevPeaceConfig, StatusEvent};
use peace_store::{ActivityType, NewActivity, Store, StoreError, WorkSession, WorklogStatus};
use peace_tracker::IssueTracker;
use peace_watch::ActivityEvent;
use tracing::{debug, info, warn};

use crate::errors::SessionError;
use crate::worklog;

/// Owns the store, the tracker, and all in-memory session bookkeeping.
/// Processes one [`ActivityEvent`] at a time; callers are expected to drain
/// a watcher's events through a single [`SessionManager`] so ordering within
/// a repository is preserved.
pub struct SessionManager {
    store: Store,
    tracker: Box<dyn IssueTracker>,
    config: DevPeaceConfig,
    active_sessions: HashMap<PathBuf, i64>,
    repo_ids: HashMap<PathBuf, i64>,
    seen_first_commit: HashSet<i64>,
}

impl SessionManager {
    pub fn new(store: Store, tracker: Box<dyn IssueTracker>, config: DevPeaceConfig) -> Self {
        Self {
            store,
            tracker,
            config,
            active_sessions: HashMap::new(),
            repo_ids: HashMap::new(),
            seen_first_commit: HashSet::new(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn active_session_count(&self) -> usize {
        self.active_sessions.len()
    }

    /// Dispatch a classified activity signal to the matching handler.
    pub fn handle_event(&mut self, event: ActivityEvent) -> Result<(), SessionError> {
        match event {
            ActivityEvent::RepoEntered {
                repo_root,
                repo_name,
                branch,
                jira_issue,
            } => self.handle_repo_entered(repo_root, &repo_name, branch, jira_issue),
            ActivityEvent::BranchChanged {
                repo_root,
                repo_name,
                old_branch,
                new_branch,
                jira_issue,
            } => self.handle_branch_changed(repo_root, &repo_name, old_branch, new_branch, jira_issue),
            ActivityEvent::CommitDetected {
                repo_root,
                commit_id,
                commit_message,
            } => self.handle_commit(repo_root, commit_id, commit_message),
            ActivityEvent::FileModified {
                repo_root,
                relative_path,
            } => self.handle_file_modified(repo_root, relative_path),
        }
    }

    fn handle_repo_entered(
        &mut self,
        repo_root: PathBuf,
        repo_name: &str,
        branch: Option<String>,
        jira_issue: Option<String>,
    ) -> Result<(), SessionError> {
        let repository_id = self.ensure_repository(&repo_root, repo_name)?;
        self.store.touch_repository_activity(repository_id)?;

        if self.active_sessions.contains_key(&repo_root) {
            debug!(event = "core.repo_entered.already_active", repo = %repo_root.display());
            return Ok(());
        }

        let branch_name = branch.unwrap_or_else(|| "unknown".to_string());
        let session_id =
            self.open_session(&repo_root, repository_id, &branch_name, jira_issue.as_deref())?;
        self.store
            .add_activity(session_id, ActivityType::RepoEntered, NewActivity::default())?;
        Ok(())
    }

    fn handle_branch_changed(
        &mut self,
        repo_root: PathBuf,
        repo_name: &str,
        old_branch: String,
        new_branch: String,
        jira_issue: Option<String>,
    ) -> Result<(), SessionError> {
        let repository_id = self.ensure_repository(&repo_root, repo_name)?;
        self.store.touch_repository_activity(repository_id)?;

        self.end_session(&repo_root)?;

        let session_id =
            self.open_session(&repo_root, repository_id, &new_branch, jira_issue.as_deref())?;
        self.store.add_activity(
            session_id,
            ActivityType::BranchChanged,
            NewActivity {
                details: Some(format!("{old_branch} -> {new_branch}")),
                ..Default::default()
            },
        )?;
        Ok(())
    }

    fn handle_commit(
        &mut self,
        repo_root: PathBuf,
        commit_id: String,
        commit_message: Option<String>,
    ) -> Result<(), SessionError> {
        let Some(&session_id) = self.active_sessions.get(&repo_root) else {
            debug!(event = "core.commit.no_active_session", repo = %repo_root.display());
            return Ok(());
        };

        let short_hash = commit_id[..commit_id.len().min(8)].to_string();
        let details = commit_message
            .as_deref()
            .map(|message| format!("Commit: {short_hash} - {message}"));

        self.store.add_activity(
            session_id,
            ActivityType::Commit,
            NewActivity {
                commit_hash: Some(commit_id),
                commit_message: commit_message.clone(),
                details,
                ..Default::default()
            },
        )?;

        if let Some(&repository_id) = self.repo_ids.get(&repo_root) {
            self.store.touch_repository_activity(repository_id)?;
        }

        let is_first_commit = self.seen_first_commit.insert(session_id);

        let Some(session) = self.store.get_session(session_id)? else {
            return Ok(());
        };
        let Some(issue_key) = session.jira_issue.clone() else {
            return Ok(());
        };

        if is_first_commit {
            if let Some(new_status) = peace_rules::evaluate(
                &self.config.status_automation,
                self.tracker.as_ref(),
                StatusEvent::OnFirstCommit,
                &issue_key,
            ) {
                self.store
                    .update_session_jira_status(session_id, None, Some(&new_status))?;
            }
        }

        if let Some(message) = commit_message {
            if message.lines().count() > self.config.commit_comment_threshold {
                let comment = format!(
                    "Commit: {short_hash}\nTime: {}\nMessage: {message}",
                    chrono::Utc::now().format("%Y-%m-%d %H:%M")
                );
                self.tracker.add_comment(&issue_key, &comment);
            }
        }

        Ok(())
    }

    fn handle_file_modified(
        &mut self,
        repo_root: PathBuf,
        relative_path: PathBuf,
    ) -> Result<(), SessionError> {
        let Some(&session_id) = self.active_sessions.get(&repo_root) else {
            debug!(event = "core.file_modified.no_active_session", repo = %repo_root.display());
            return Ok(());
        };

        self.store.add_activity(
            session_id,
            ActivityType::FileModified,
            NewActivity {
                file_path: Some(relative_path.to_string_lossy().into_owned()),
                ..Default::default()
            },
        )?;

        if let Some(&repository_id) = self.repo_ids.get(&repo_root) {
            self.store.touch_repository_activity(repository_id)?;
        }
        Ok(())
    }

    fn ensure_repository(&mut self, repo_root: &Path, repo_name: &str) -> Result<i64, SessionError> {
        if let Some(&id) = self.repo_ids.get(repo_root) {
            return Ok(id);
        }

        let path_str = repo_root.to_string_lossy().into_owned();
        let id = match self.store.get_repository_by_path(&path_str)? {
            Some(repo) => repo.id,
            None => self.store.add_repository(&path_str, repo_name)?,
        };
        self.repo_ids.insert(repo_root.to_path_buf(), id);
        Ok(id)
    }

    /// Open a session for `branch` on `repository_id`, capturing the issue's
    /// original remote status once and attempting `on_work_start` automation.
    /// If no issue is derivable, the session is orphaned immediately: an
    /// OrphanRecord is created right here, before the session ever becomes
    /// observable, so it exists even if the process never reaches session
    /// end (I3). Does not record any activity — callers record the one that
    /// triggered the new session.
    fn open_session(
        &mut self,
        repo_root: &Path,
        repository_id: i64,
        branch: &str,
        jira_issue: Option<&str>,
    ) -> Result<i64, SessionError> {
        let original_status = jira_issue
            .and_then(|key| self.tracker.get_issue(key))
            .map(|issue| issue.status);

        let session_id = self.store.start_session(
            repository_id,
            branch,
            jira_issue,
            original_status.as_deref(),
            original_status.as_deref(),
        )?;

        if let Some(issue_key) = jira_issue {
            if let Some(new_status) = peace_rules::evaluate(
                &self.config.status_automation,
                self.tracker.as_ref(),
                StatusEvent::OnWorkStart,
                issue_key,
            ) {
                self.store
                    .update_session_jira_status(session_id, None, Some(&new_status))?;
            }
        } else {
            self.store.mark_session_orphaned(session_id)?;
            self.store.create_orphan(session_id, branch)?;
        }

        self.active_sessions.insert(repo_root.to_path_buf(), session_id);
        info!(
            event = "core.session.started",
            repo = %repo_root.display(),
            branch = %branch,
            issue = ?jira_issue
        );
        Ok(session_id)
    }

    /// End the active session for `repo_root`, if any: finalizes duration,
    /// runs auto-revert bookkeeping (orphan bookkeeping already happened at
    /// session open, see `open_session`), and emits the worklog. A no-op if
    /// no session is active there.
    pub fn end_session(&mut self, repo_root: &Path) -> Result<(), SessionError> {
        let Some(session_id) = self.active_sessions.remove(repo_root) else {
            return Ok(());
        };
        self.seen_first_commit.remove(&session_id);

        self.store.end_session(session_id)?;
        let session = self
            .store
            .get_session(session_id)?
            .ok_or(StoreError::SessionNotFound { id: session_id })?;

        if let (Some(issue_key), Some(original_status)) =
            (session.jira_issue.as_deref(), session.original_jira_status.as_deref())
        {
            if self.config.status_automation.auto_revert_on_session_end {
                peace_rules::on_session_end(
                    &self.config.status_automation,
                    self.tracker.as_ref(),
                    issue_key,
                    original_status,
                );
            }
        }

        self.emit_worklog(&session)?;

        info!(
            event = "core.session.ended",
            repo = %repo_root.display(),
            minutes = session.total_minutes
        );
        Ok(())
    }

    fn emit_worklog(&mut self, session: &WorkSession) -> Result<(), SessionError> {
        if !self.config.auto_worklog {
            return Ok(());
        }
        let Some(issue_key) = session.jira_issue.clone() else {
            return Ok(());
        };
        if session.total_minutes < self.config.min_session_minutes as i64 {
            debug!(
                event = "core.worklog.skipped",
                reason = "below_min_session_minutes",
                minutes = session.total_minutes
            );
            return Ok(());
        }

        let activities = self.store.list_activities_for_session(session.id)?;
        let description = worklog::synthesize_description(&activities)
            .unwrap_or_else(|| self.config.worklog_description_template.clone());
        let time_spent = peace_tracker::format_time_spent(session.total_minutes);

        match self
            .tracker
            .add_worklog(&issue_key, &time_spent, &description, Some(session.start_time))
        {
            Some(worklog_id) => {
                self.store.set_session_worklog_id(session.id, &worklog_id)?;
                self.store.record_worklog(
                    session.id,
                    &issue_key,
                    &worklog_id,
                    session.total_minutes,
                    &description,
                    WorklogStatus::Sent,
                )?;
                info!(event = "core.worklog.sent", issue = %issue_key, minutes = session.total_minutes);
            }
            None => {
                self.store.record_worklog(
                    session.id,
                    &issue_key,
                    "",
                    session.total_minutes,
                    &description,
                    WorklogStatus::Failed,
                )?;
                warn!(event = "core.worklog.send_failed", issue = %issue_key);
            }
        }
        Ok(())
    }

    /// End the active session for `repo_root` on demand (e.g. a CLI `stop`
    /// command). Returns whether a session was actually active.
    pub fn force_end_session(&mut self, repo_root: &Path) -> Result<bool, SessionError> {
        if !self.active_sessions.contains_key(repo_root) {
            return Ok(false);
        }
        self.end_session(repo_root)?;
        Ok(true)
    }

    /// End every active session. Used during graceful shutdown; individual
    /// failures are logged rather than propagated so one bad session can't
    /// block the rest from closing out.
    pub fn end_all_sessions(&mut self) {
        let roots: Vec<PathBuf> = self.active_sessions.keys().cloned().collect();
        for root in roots {
            if let Err(e) = self.end_session(&root) {
                warn!(event = "core.session.end_failed", repo = %root.display(), error = %e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use peace_tracker::{Issue, IssueSummary, IssueWorkflow, NullTracker, Project, Transition};
    use std::sync::{Arc, Mutex};

    struct StubTracker {
        status: Mutex<String>,
        worklogs: Mutex<Vec<String>>,
        comments: Arc<Mutex<Vec<String>>>,
    }

    impl StubTracker {
        fn new(status: &str) -> Self {
            Self {
                status: Mutex::new(status.to_string()),
                worklogs: Mutex::new(Vec::new()),
                comments: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn with_shared_comments(status: &str, comments: Arc<Mutex<Vec<String>>>) -> Self {
            Self {
                status: Mutex::new(status.to_string()),
                worklogs: Mutex::new(Vec::new()),
                comments,
            }
        }
    }

    impl IssueTracker for StubTracker {
        fn connect(&self) -> bool {
            true
        }
        fn is_connected(&self) -> bool {
            true
        }
        fn get_issue(&self, key: &str) -> Option<Issue> {
            Some(Issue {
                key: key.to_string(),
                summary: String::new(),
                description: None,
                status: self.status.lock().unwrap().clone(),
                assignee: None,
                project: "PROJ".to_string(),
                issue_type: "Task".to_string(),
                created: String::new(),
                updated: String::new(),
            })
        }
        fn add_worklog(
            &self,
            _key: &str,
            time_spent: &str,
            _comment: &str,
            _started: Option<DateTime<Utc>>,
        ) -> Option<String> {
            self.worklogs.lock().unwrap().push(time_spent.to_string());
            Some("10001".to_string())
        }
        fn add_comment(&self, _key: &str, body: &str) -> bool {
            self.comments.lock().unwrap().push(body.to_string());
            true
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
        fn transition(&self, _key: &str, target_status_name: &str) -> bool {
            *self.status.lock().unwrap() = target_status_name.to_string();
            true
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

    fn manager_with(tracker: Box<dyn IssueTracker>, config: DevPeaceConfig) -> SessionManager {
        SessionManager::new(Store::open_in_memory().unwrap(), tracker, config)
    }

    #[test]
    fn repo_entered_without_issue_opens_a_session() {
        let mut manager = manager_with(Box::new(NullTracker), DevPeaceConfig::default());
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("quick-fix".to_string()),
                jira_issue: None,
            })
            .unwrap();

        assert_eq!(manager.active_session_count(), 1);

        // Re-entering the same repo while a session is active is a no-op.
        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("quick-fix".to_string()),
                jira_issue: None,
            })
            .unwrap();
        assert_eq!(manager.active_session_count(), 1);
    }

    #[test]
    fn opening_a_session_without_an_issue_creates_an_orphan_record_immediately() {
        let mut manager = manager_with(Box::new(NullTracker), DevPeaceConfig::default());
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("quick-fix".to_string()),
                jira_issue: None,
            })
            .unwrap();

        // The orphan record exists as soon as the session opens, not just
        // once it ends — a crash before end_session must not lose it.
        assert_eq!(manager.active_session_count(), 1);
        assert_eq!(manager.store().list_unassigned_orphans().unwrap().len(), 1);

        manager.end_session(&repo_root).unwrap();

        assert_eq!(manager.active_session_count(), 0);
        assert_eq!(manager.store().list_unassigned_orphans().unwrap().len(), 1);
    }

    #[test]
    fn branch_change_ends_the_previous_session_and_opens_a_new_one() {
        let mut manager = manager_with(Box::new(NullTracker), DevPeaceConfig::default());
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("main".to_string()),
                jira_issue: None,
            })
            .unwrap();
        let first_session = *manager.active_sessions.get(&repo_root).unwrap();

        manager
            .handle_event(ActivityEvent::BranchChanged {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                old_branch: "main".to_string(),
                new_branch: "feature/PROJ-1-thing".to_string(),
                jira_issue: Some("PROJ-1".to_string()),
            })
            .unwrap();

        assert_eq!(manager.active_session_count(), 1);
        let second_session = *manager.active_sessions.get(&repo_root).unwrap();
        assert_ne!(first_session, second_session);

        let ended = manager.store().get_session(first_session).unwrap().unwrap();
        assert!(!ended.is_active);
    }

    #[test]
    fn first_commit_triggers_on_first_commit_automation_once() {
        let mut config = DevPeaceConfig::default();
        config.status_automation.enabled = true;
        config.status_automation.events.insert(
            StatusEvent::OnFirstCommit.key().to_string(),
            vec![peace_config::TransitionRule {
                from: peace_config::FromSpec::Single("To Do".to_string()),
                to: "In Progress".to_string(),
            }],
        );

        let mut manager = manager_with(Box::new(StubTracker::new("To Do")), config);
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("feature/PROJ-1-thing".to_string()),
                jira_issue: Some("PROJ-1".to_string()),
            })
            .unwrap();

        manager
            .handle_event(ActivityEvent::CommitDetected {
                repo_root: repo_root.clone(),
                commit_id: "abc123".to_string(),
                commit_message: Some("first commit".to_string()),
            })
            .unwrap();

        let session_id = *manager.active_sessions.get(&repo_root).unwrap();
        let session = manager.store().get_session(session_id).unwrap().unwrap();
        assert_eq!(session.current_jira_status.as_deref(), Some("In Progress"));

        // A second commit must not re-trigger the transition.
        manager
            .handle_event(ActivityEvent::CommitDetected {
                repo_root: repo_root.clone(),
                commit_id: "def456".to_string(),
                commit_message: Some("second commit".to_string()),
            })
            .unwrap();
        assert_eq!(manager.store().count_commits_for_session(session_id).unwrap(), 2);
    }

    #[test]
    fn multi_line_commit_message_posts_a_comment() {
        let config = DevPeaceConfig::default();
        let comments = Arc::new(Mutex::new(Vec::new()));
        let tracker = StubTracker::with_shared_comments("To Do", comments.clone());

        let mut manager = manager_with(Box::new(tracker), config);
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("feature/PROJ-1-thing".to_string()),
                jira_issue: Some("PROJ-1".to_string()),
            })
            .unwrap();

        manager
            .handle_event(ActivityEvent::CommitDetected {
                repo_root: repo_root.clone(),
                commit_id: "abc123def".to_string(),
                commit_message: Some("Single line summary".to_string()),
            })
            .unwrap();
        assert!(comments.lock().unwrap().is_empty());

        manager
            .handle_event(ActivityEvent::CommitDetected {
                repo_root: repo_root.clone(),
                commit_id: "fed321cba".to_string(),
                commit_message: Some("Summary line\n\nBody explaining the change".to_string()),
            })
            .unwrap();
        let posted = comments.lock().unwrap();
        assert_eq!(posted.len(), 1);
        assert!(posted[0].contains("fed321cb"));
        assert!(posted[0].contains("Body explaining the change"));
    }

    #[test]
    fn worklog_is_emitted_when_session_clears_the_minimum_duration() {
        let mut config = DevPeaceConfig::default();
        config.min_session_minutes = 0;
        let tracker = StubTracker::new("To Do");

        let mut manager = manager_with(Box::new(tracker), config);
        let repo_root = PathBuf::from("/repo/a");

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("feature/PROJ-1-thing".to_string()),
                jira_issue: Some("PROJ-1".to_string()),
            })
            .unwrap();
        let session_id = *manager.active_sessions.get(&repo_root).unwrap();

        manager.end_session(&repo_root).unwrap();

        let worklogs = manager.store().list_worklogs_for_session(session_id).unwrap();
        assert_eq!(worklogs.len(), 1);
        assert_eq!(worklogs[0].status, peace_store::WorklogStatus::Sent);
    }

    #[test]
    fn force_end_session_reports_whether_a_session_was_active() {
        let mut manager = manager_with(Box::new(NullTracker), DevPeaceConfig::default());
        let repo_root = PathBuf::from("/repo/a");

        assert!(!manager.force_end_session(&repo_root).unwrap());

        manager
            .handle_event(ActivityEvent::RepoEntered {
                repo_root: repo_root.clone(),
                repo_name: "a".to_string(),
                branch: Some("main".to_string()),
                jira_issue: None,
            })
            .unwrap();
        assert!(manager.force_end_session(&repo_root).unwrap());
        assert!(!manager.force_end_session(&repo_root).unwrap());
    }
}
