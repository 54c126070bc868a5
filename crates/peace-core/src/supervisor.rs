//! The top-level supervisor: owns the filesystem watcher and drives the
//! session manager from its events, matching the watch-then-drain poll loop
//! the daemon binary runs on a fixed interval.

use std::collections::HashSet;
use std::path::PathBuf;

use peace_watch::GitActivityWatcher;
use tracing::{info, warn};

use crate::errors::SessionError;
use crate::manager::SessionManager;

/// A snapshot of the supervisor's runtime state, for status reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorStats {
    pub total_repositories: usize,
    pub active_repositories: usize,
    pub active_sessions: usize,
    pub orphan_count: usize,
    pub monitored_repositories: usize,
    pub running: bool,
}

pub struct Supervisor {
    manager: SessionManager,
    watcher: Option<GitActivityWatcher>,
    ignore_patterns: Vec<String>,
    monitored_paths: HashSet<PathBuf>,
}

impl Supervisor {
    pub fn new(manager: SessionManager, ignore_patterns: Vec<String>) -> Self {
        Self {
            manager,
            watcher: None,
            ignore_patterns,
            monitored_paths: HashSet::new(),
        }
    }

    pub fn manager(&self) -> &SessionManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut SessionManager {
        &mut self.manager
    }

    /// Start watching `paths`, or every already-active repository recorded
    /// in the store when `paths` is `None`. A no-op (no watcher created) if
    /// the resolved root list is empty.
    pub fn start(&mut self, paths: Option<Vec<PathBuf>>) -> Result<(), SessionError> {
        let roots = match paths {
            Some(p) => p,
            None => self.active_repository_paths()?,
        };

        if roots.is_empty() {
            info!(event = "core.supervisor.start_no_roots");
            return Ok(());
        }

        match GitActivityWatcher::new(&roots, &self.ignore_patterns) {
            Some(watcher) => {
                self.monitored_paths.extend(roots);
                info!(
                    event = "core.supervisor.start_completed",
                    roots = self.monitored_paths.len()
                );
                self.watcher = Some(watcher);
            }
            None => {
                warn!(event = "core.supervisor.start_watch_failed");
            }
        }
        Ok(())
    }

    fn active_repository_paths(&self) -> Result<Vec<PathBuf>, SessionError> {
        let repos = self.manager.store().list_repositories()?;
        Ok(repos
            .into_iter()
            .filter(|r| r.is_active)
            .map(|r| PathBuf::from(r.path))
            .collect())
    }

    /// Pick up repositories that became active since the last refresh and
    /// start watching them. Never stops watching a root that is already
    /// being watched.
    pub fn refresh(&mut self) -> Result<(), SessionError> {
        let roots = self.active_repository_paths()?;

        let Some(watcher) = self.watcher.as_mut() else {
            return self.start(Some(roots));
        };

        for root in roots {
            if !self.monitored_paths.contains(&root) && watcher.watch_additional_root(&root) {
                self.monitored_paths.insert(root);
            }
        }
        Ok(())
    }

    /// Drain pending filesystem events and dispatch them to the session
    /// manager. Per-event failures are logged, never propagated — a single
    /// unreadable repository must not stop the poll loop.
    pub fn poll(&mut self) {
        let Some(watcher) = self.watcher.as_mut() else {
            return;
        };
        for event in watcher.poll_events() {
            if let Err(e) = self.manager.handle_event(event) {
                warn!(event = "core.supervisor.event_failed", error = %e);
            }
        }
    }

    /// Aggregate runtime stats for status/stats CLI projections (§4.8).
    pub fn stats(&self) -> Result<SupervisorStats, SessionError> {
        let repos = self.manager.store().list_repositories()?;
        let active_repositories = repos.iter().filter(|r| r.is_active).count();
        let orphan_count = self.manager.store().list_unassigned_orphans()?.len();

        Ok(SupervisorStats {
            total_repositories: repos.len(),
            active_repositories,
            active_sessions: self.manager.active_session_count(),
            orphan_count,
            monitored_repositories: self.monitored_paths.len(),
            running: self.watcher.is_some(),
        })
    }

    /// Flush every active session through its normal end-of-session
    /// procedure and stop watching.
    pub fn shutdown(&mut self) {
        self.manager.end_all_sessions();
        self.watcher = None;
    }
}
