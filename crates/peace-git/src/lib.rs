//! Git repository introspection for dev-peace.
//!
//! All queries are fail-soft: on any error (repo can't be opened, file
//! missing, not UTF-8) these functions return `None`/`false` rather than
//! propagating an error. The filesystem watcher and session manager run in a
//! tight loop and a single unreadable repository must never take the whole
//! daemon down.

use std::fs;
use std::path::{Path, PathBuf};

use git2::Repository;
use tracing::debug;

/// Check if `path` itself is a git repository (has a `.git` directory or
/// gitfile, not a parent).
pub fn is_git_repository(path: &Path) -> bool {
    let git_dir = path.join(".git");
    git_dir.exists()
}

/// Walk upward from `path` to find the repository root (the first ancestor,
/// inclusive, containing a `.git` entry).
pub fn repository_root(path: &Path) -> Option<PathBuf> {
    let mut current = path.canonicalize().ok()?;

    loop {
        if is_git_repository(&current) {
            return Some(current);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => return None,
        }
    }
}

/// The repository's directory name, used as its display name.
pub fn repository_name(repo_root: &Path) -> String {
    repo_root
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| repo_root.display().to_string())
}

/// The current branch's short name (e.g. `feature/PROJ-123-thing`).
///
/// Returns `None` if the repository can't be opened or HEAD is unborn
/// (a fresh repository with no commits).
pub fn current_branch(repo_root: &Path) -> Option<String> {
    let repo = match Repository::open(repo_root) {
        Ok(r) => r,
        Err(e) => {
            debug!(
                event = "git.current_branch.repo_open_failed",
                path = %repo_root.display(),
                error = %e
            );
            return None;
        }
    };

    if repo.head_detached().unwrap_or(false) {
        debug!(event = "git.current_branch.detached_head", path = %repo_root.display());
    }

    let head = match repo.head() {
        Ok(h) => h,
        Err(e) => {
            debug!(
                event = "git.current_branch.head_unborn",
                path = %repo_root.display(),
                error = %e
            );
            return None;
        }
    };

    head.shorthand().map(str::to_string)
}

/// Extract a Jira-style issue key from a branch name, delegating to
/// [`peace_branch::extract_issue`].
pub fn extract_jira_issue(branch_name: &str) -> Option<String> {
    peace_branch::extract_issue(branch_name)
}

/// The full commit message for `commit_id` (a hex SHA), trimmed.
///
/// Returns `None` if the repository can't be opened, the id doesn't parse,
/// or the object isn't a commit.
pub fn commit_message(repo_root: &Path, commit_id: &str) -> Option<String> {
    let repo = Repository::open(repo_root).ok()?;
    let oid = git2::Oid::from_str(commit_id).ok()?;
    let commit = repo.find_commit(oid).ok()?;
    commit.message().map(|m| m.trim().to_string())
}

/// The hash of the most recent entry in `.git/logs/HEAD` — the commit that
/// just landed on the checked-out branch.
///
/// Read directly from the reflog file rather than through git2: each line is
/// `old_hash new_hash author timestamp message`, and the new hash of the
/// last line is the latest commit.
pub fn latest_commit_hash(repo_root: &Path) -> Option<String> {
    let log_path = repo_root.join(".git").join("logs").join("HEAD");
    let contents = fs::read_to_string(&log_path).ok()?;
    let last_line = contents.lines().last()?.trim();
    let mut parts = last_line.splitn(3, ' ');
    parts.next()?;
    let new_hash = parts.next()?;
    if new_hash.is_empty() {
        None
    } else {
        Some(new_hash.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tempfile::TempDir;

    fn init_repo(dir: &Path) {
        Command::new("git")
            .args(["init", "-q", "-b", "main"])
            .current_dir(dir)
            .output()
            .unwrap();
        Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir)
            .output()
            .unwrap();
        Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .output()
            .unwrap();
    }

    fn commit(dir: &Path, message: &str) {
        fs::write(dir.join("file.txt"), message).unwrap();
        Command::new("git")
            .args(["add", "."])
            .current_dir(dir)
            .output()
            .unwrap();
        Command::new("git")
            .args(["commit", "-q", "-m", message])
            .current_dir(dir)
            .output()
            .unwrap();
    }

    #[test]
    fn detects_git_repository() {
        let temp = TempDir::new().unwrap();
        assert!(!is_git_repository(temp.path()));
        init_repo(temp.path());
        assert!(is_git_repository(temp.path()));
    }

    #[test]
    fn finds_repository_root_from_nested_path() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        let nested = temp.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();

        let root = repository_root(&nested).unwrap();
        assert_eq!(root, temp.path().canonicalize().unwrap());
    }

    #[test]
    fn repository_root_is_none_outside_a_repo() {
        let temp = TempDir::new().unwrap();
        assert!(repository_root(temp.path()).is_none());
    }

    #[test]
    fn current_branch_is_none_before_first_commit() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        assert!(current_branch(temp.path()).is_none());
    }

    #[test]
    fn current_branch_after_commit() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        commit(temp.path(), "initial");
        assert_eq!(current_branch(temp.path()).as_deref(), Some("main"));
    }

    #[test]
    fn latest_commit_hash_reads_reflog_tail() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        commit(temp.path(), "first");
        let first_hash = latest_commit_hash(temp.path()).unwrap();
        assert_eq!(first_hash.len(), 40);

        commit(temp.path(), "second");
        let second_hash = latest_commit_hash(temp.path()).unwrap();
        assert_ne!(first_hash, second_hash);
    }

    #[test]
    fn commit_message_reads_full_text() {
        let temp = TempDir::new().unwrap();
        init_repo(temp.path());
        commit(temp.path(), "PROJ-123 fix the thing");
        let hash = latest_commit_hash(temp.path()).unwrap();
        assert_eq!(
            commit_message(temp.path(), &hash).as_deref(),
            Some("PROJ-123 fix the thing")
        );
    }

    #[test]
    fn extract_jira_issue_delegates_to_branch_parser() {
        assert_eq!(
            extract_jira_issue("feature/PROJ-123-thing"),
            Some("PROJ-123".to_string())
        );
        assert!(extract_jira_issue("main").is_none());
    }
}
