use rusqlite::Connection;
use tracing::debug;

use crate::errors::StoreError;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS repositories (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT UNIQUE NOT NULL,
    name TEXT NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    last_activity TEXT
);

CREATE TABLE IF NOT EXISTS work_sessions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    repository_id INTEGER NOT NULL,
    branch_name TEXT NOT NULL,
    jira_issue TEXT,
    start_time TEXT NOT NULL DEFAULT (datetime('now')),
    end_time TEXT,
    total_minutes INTEGER NOT NULL DEFAULT 0,
    is_active BOOLEAN NOT NULL DEFAULT 1,
    jira_worklog_id TEXT,
    status TEXT NOT NULL DEFAULT 'active',
    FOREIGN KEY (repository_id) REFERENCES repositories (id)
);

CREATE TABLE IF NOT EXISTS activities (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    activity_type TEXT NOT NULL,
    file_path TEXT,
    commit_hash TEXT,
    commit_message TEXT,
    timestamp TEXT NOT NULL DEFAULT (datetime('now')),
    details TEXT,
    FOREIGN KEY (session_id) REFERENCES work_sessions (id)
);

CREATE TABLE IF NOT EXISTS jira_worklogs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    jira_issue TEXT NOT NULL,
    jira_worklog_id TEXT NOT NULL,
    time_spent_minutes INTEGER NOT NULL,
    description TEXT,
    sent_at TEXT NOT NULL DEFAULT (datetime('now')),
    status TEXT NOT NULL DEFAULT 'sent',
    FOREIGN KEY (session_id) REFERENCES work_sessions (id)
);

CREATE TABLE IF NOT EXISTS orphan_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    session_id INTEGER NOT NULL,
    branch_name TEXT NOT NULL,
    total_minutes INTEGER NOT NULL DEFAULT 0,
    activities_count INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    assigned_issue TEXT,
    status TEXT NOT NULL DEFAULT 'orphaned',
    FOREIGN KEY (session_id) REFERENCES work_sessions (id)
);
";

/// Create tables if absent, then apply any additive column migrations the
/// running code expects but an existing database predates.
pub fn init(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(CREATE_TABLES)?;
    migrate_work_sessions(conn)?;
    Ok(())
}

fn migrate_work_sessions(conn: &Connection) -> Result<(), StoreError> {
    let existing = table_columns(conn, "work_sessions")?;

    if !existing.iter().any(|c| c == "original_jira_status") {
        conn.execute(
            "ALTER TABLE work_sessions ADD COLUMN original_jira_status TEXT",
            [],
        )?;
        debug!(event = "store.migration.column_added", column = "original_jira_status");
    }

    if !existing.iter().any(|c| c == "current_jira_status") {
        conn.execute(
            "ALTER TABLE work_sessions ADD COLUMN current_jira_status TEXT",
            [],
        )?;
        debug!(event = "store.migration.column_added", column = "current_jira_status");
    }

    Ok(())
}

fn table_columns(conn: &Connection, table: &str) -> Result<Vec<String>, StoreError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init(&conn).unwrap();
        init(&conn).unwrap();

        let columns = table_columns(&conn, "work_sessions").unwrap();
        assert!(columns.contains(&"original_jira_status".to_string()));
        assert!(columns.contains(&"current_jira_status".to_string()));
    }
}
