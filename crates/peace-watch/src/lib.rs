//! Filesystem watching and event classification for dev-peace.
//!
//! Wraps one `notify` watcher per watched root and turns raw filesystem
//! events into the four activity signals the session manager understands:
//! repo-entry, branch-change, commit, and file-modification. All dedup and
//! ordering state (last-seen branch per root, reported commit ids per root)
//! lives here, owned exclusively by whichever task drains [`GitActivityWatcher::poll_events`].

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};

use glob::Pattern;
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, warn};

/// A classified activity signal, ready for the session manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivityEvent {
    RepoEntered {
        repo_root: PathBuf,
        repo_name: String,
        branch: Option<String>,
        jira_issue: Option<String>,
    },
    BranchChanged {
        repo_root: PathBuf,
        repo_name: String,
        old_branch: String,
        new_branch: String,
        jira_issue: Option<String>,
    },
    CommitDetected {
        repo_root: PathBuf,
        commit_id: String,
        commit_message: Option<String>,
    },
    FileModified {
        repo_root: PathBuf,
        relative_path: PathBuf,
    },
}

struct RepoTracking {
    last_branch: Option<String>,
    seen_commits: HashSet<String>,
}

/// Watches one or more git working trees and classifies raw filesystem
/// events into [`ActivityEvent`]s.
pub struct GitActivityWatcher {
    _watchers: Vec<RecommendedWatcher>,
    sender: mpsc::Sender<Result<Event, notify::Error>>,
    receiver: Receiver<Result<Event, notify::Error>>,
    watched_roots: HashSet<PathBuf>,
    tracked: HashMap<PathBuf, RepoTracking>,
    ignore_patterns: Vec<Pattern>,
}

impl GitActivityWatcher {
    /// Start watching `roots` recursively. Invalid glob patterns in
    /// `ignore_patterns` are logged and skipped rather than failing the
    /// whole watcher. Returns `None` if no root could be watched.
    pub fn new(roots: &[PathBuf], ignore_patterns: &[String]) -> Option<Self> {
        let (tx, rx) = mpsc::channel();
        let mut watchers = Vec::new();
        let mut watched_roots = HashSet::new();

        for root in roots {
            match Self::create_watcher(root, tx.clone()) {
                Some(w) => {
                    watchers.push(w);
                    watched_roots.insert(root.clone());
                    tracing::info!(event = "watch.root_added", path = %root.display());
                }
                None => {
                    warn!(event = "watch.root_failed", path = %root.display());
                }
            }
        }

        if watchers.is_empty() {
            return None;
        }

        let patterns = ignore_patterns
            .iter()
            .filter_map(|p| match Pattern::new(p) {
                Ok(compiled) => Some(compiled),
                Err(e) => {
                    warn!(event = "watch.bad_ignore_pattern", pattern = %p, error = %e);
                    None
                }
            })
            .collect();

        Some(Self {
            _watchers: watchers,
            sender: tx,
            receiver: rx,
            watched_roots,
            tracked: HashMap::new(),
            ignore_patterns: patterns,
        })
    }

    /// Add another watched root to an already-running watcher, for C8's
    /// `refresh` operation. A no-op if the root is already watched. Returns
    /// `false` if the root can't be watched (missing, permission denied).
    pub fn watch_additional_root(&mut self, root: &Path) -> bool {
        if self.watched_roots.contains(root) {
            return true;
        }
        match Self::create_watcher(root, self.sender.clone()) {
            Some(w) => {
                self._watchers.push(w);
                self.watched_roots.insert(root.to_path_buf());
                tracing::info!(event = "watch.root_added", path = %root.display());
                true
            }
            None => {
                warn!(event = "watch.root_failed", path = %root.display());
                false
            }
        }
    }

    fn create_watcher(
        dir: &Path,
        tx: mpsc::Sender<Result<Event, notify::Error>>,
    ) -> Option<RecommendedWatcher> {
        if !dir.is_dir() {
            return None;
        }
        let mut watcher = notify::recommended_watcher(tx).ok()?;
        watcher.watch(dir, RecursiveMode::Recursive).ok()?;
        Some(watcher)
    }

    /// Drain all pending filesystem events and return their classified
    /// activity signals, in arrival order.
    pub fn poll_events(&mut self) -> Vec<ActivityEvent> {
        let mut out = Vec::new();

        loop {
            match self.receiver.try_recv() {
                Ok(Ok(event)) => {
                    for path in &event.paths {
                        if let Some(activity) = self.classify(path) {
                            out.push(activity);
                        }
                    }
                }
                Ok(Err(e)) => {
                    warn!(event = "watch.event_error", error = %e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    warn!(event = "watch.channel_disconnected");
                    break;
                }
            }
        }

        out
    }

    fn classify(&mut self, path: &Path) -> Option<ActivityEvent> {
        let repo_root = peace_git::repository_root(path)?;

        if !self.tracked.contains_key(&repo_root) {
            return Some(self.handle_repo_entry(repo_root));
        }

        if is_branch_change_path(path) {
            return self.handle_branch_recheck(&repo_root);
        }

        if is_commit_path(path) {
            return self.handle_commit(&repo_root);
        }

        if path_traverses_git_dir(path) {
            return None;
        }

        if let Some(branch_change) = self.handle_branch_recheck(&repo_root) {
            return Some(branch_change);
        }

        self.handle_file_modification(&repo_root, path)
    }

    fn handle_repo_entry(&mut self, repo_root: PathBuf) -> ActivityEvent {
        let branch = peace_git::current_branch(&repo_root);
        let jira_issue = branch.as_deref().and_then(peace_git::extract_jira_issue);
        let repo_name = peace_git::repository_name(&repo_root);

        self.tracked.insert(
            repo_root.clone(),
            RepoTracking {
                last_branch: branch.clone(),
                seen_commits: HashSet::new(),
            },
        );

        debug!(event = "watch.repo_entered", path = %repo_root.display(), branch = ?branch);

        ActivityEvent::RepoEntered {
            repo_root,
            repo_name,
            branch,
            jira_issue,
        }
    }

    fn handle_branch_recheck(&mut self, repo_root: &Path) -> Option<ActivityEvent> {
        let new_branch = peace_git::current_branch(repo_root)?;
        let state = self.tracked.get_mut(repo_root)?;

        let old_branch = state.last_branch.clone();
        if old_branch.as_deref() == Some(new_branch.as_str()) {
            return None;
        }

        state.last_branch = Some(new_branch.clone());
        state.seen_commits.clear();

        let old_branch = old_branch?;

        let jira_issue = peace_git::extract_jira_issue(&new_branch);
        let repo_name = peace_git::repository_name(repo_root);

        debug!(
            event = "watch.branch_changed",
            path = %repo_root.display(),
            old_branch = %old_branch,
            new_branch = %new_branch
        );

        Some(ActivityEvent::BranchChanged {
            repo_root: repo_root.to_path_buf(),
            repo_name,
            old_branch,
            new_branch,
            jira_issue,
        })
    }

    fn handle_commit(&mut self, repo_root: &Path) -> Option<ActivityEvent> {
        let commit_id = peace_git::latest_commit_hash(repo_root)?;
        let state = self.tracked.get_mut(repo_root)?;

        if !state.seen_commits.insert(commit_id.clone()) {
            return None;
        }

        let commit_message = peace_git::commit_message(repo_root, &commit_id);

        debug!(
            event = "watch.commit_detected",
            path = %repo_root.display(),
            commit_id = %commit_id
        );

        Some(ActivityEvent::CommitDetected {
            repo_root: repo_root.to_path_buf(),
            commit_id,
            commit_message,
        })
    }

    fn handle_file_modification(&self, repo_root: &Path, path: &Path) -> Option<ActivityEvent> {
        let relative_path = path.strip_prefix(repo_root).ok()?.to_path_buf();

        let relative_str = relative_path.to_string_lossy();
        if self
            .ignore_patterns
            .iter()
            .any(|p| p.matches(&relative_str))
        {
            return None;
        }

        Some(ActivityEvent::FileModified {
            repo_root: repo_root.to_path_buf(),
            relative_path,
        })
    }
}

fn path_traverses_git_dir(path: &Path) -> bool {
    path.components()
        .any(|c| c.as_os_str() == std::ffi::OsStr::new(".git"))
}

fn is_branch_change_path(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "HEAD")
        && path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == ".git")
}

fn is_commit_path(path: &Path) -> bool {
    path.file_name().is_some_and(|n| n == "HEAD")
        && path
            .parent()
            .and_then(Path::file_name)
            .is_some_and(|n| n == "logs")
        && path
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .is_some_and(|n| n == ".git")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_change_path_matches_git_head() {
        assert!(is_branch_change_path(Path::new("/repo/.git/HEAD")));
        assert!(!is_branch_change_path(Path::new("/repo/.git/logs/HEAD")));
        assert!(!is_branch_change_path(Path::new("/repo/HEAD")));
    }

    #[test]
    fn commit_path_matches_reflog_head() {
        assert!(is_commit_path(Path::new("/repo/.git/logs/HEAD")));
        assert!(!is_commit_path(Path::new("/repo/.git/HEAD")));
    }

    #[test]
    fn traverses_git_dir_detects_nested_segment() {
        assert!(path_traverses_git_dir(Path::new("/repo/.git/objects/ab/cd")));
        assert!(!path_traverses_git_dir(Path::new("/repo/src/main.rs")));
    }

    #[test]
    fn watcher_returns_none_for_nonexistent_roots() {
        let watcher = GitActivityWatcher::new(&[PathBuf::from("/nonexistent/path")], &[]);
        assert!(watcher.is_none());
    }

    #[test]
    fn watcher_starts_with_existing_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let watcher = GitActivityWatcher::new(&[dir.path().to_path_buf()], &[]);
        assert!(watcher.is_some());
    }

    #[test]
    fn classify_first_touch_is_repo_entry() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let mut watcher = GitActivityWatcher::new(&[dir.path().to_path_buf()], &[]).unwrap();

        let event = watcher.classify(&dir.path().join(".git").join("HEAD"));
        assert!(matches!(event, Some(ActivityEvent::RepoEntered { .. })));

        // Second touch of the same path with no branch change is not an entry again.
        let second = watcher.classify(&dir.path().join(".git").join("HEAD"));
        assert!(second.is_none());
    }

    #[test]
    fn classify_ignores_patterns() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let mut watcher = GitActivityWatcher::new(
            &[dir.path().to_path_buf()],
            &["*.tmp".to_string()],
        )
        .unwrap();

        watcher.classify(&dir.path().join(".git").join("HEAD"));
        let event = watcher.classify(&dir.path().join("scratch.tmp"));
        assert!(event.is_none());
    }

    #[test]
    fn classify_reports_relative_file_modification() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join(".git")).unwrap();
        let mut watcher = GitActivityWatcher::new(&[dir.path().to_path_buf()], &[]).unwrap();

        watcher.classify(&dir.path().join(".git").join("HEAD"));
        let event = watcher
            .classify(&dir.path().join("src").join("main.rs"))
            .unwrap();
        match event {
            ActivityEvent::FileModified { relative_path, .. } => {
                assert_eq!(relative_path, PathBuf::from("src/main.rs"));
            }
            other => panic!("expected FileModified, got {other:?}"),
        }
    }
}
