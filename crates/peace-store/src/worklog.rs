use chrono::Utc;
use rusqlite::params;

use crate::errors::StoreError;
use crate::types::{JiraWorklog, WorklogStatus};
use crate::Store;

impl Store {
    /// Record the outcome of an attempted worklog emission, successful or
    /// not — the session-end procedure persists this regardless of whether
    /// the remote call succeeded.
    pub fn record_worklog(
        &self,
        session_id: i64,
        jira_issue: &str,
        jira_worklog_id: &str,
        time_spent_minutes: i64,
        description: &str,
        status: WorklogStatus,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO jira_worklogs
                (session_id, jira_issue, jira_worklog_id, time_spent_minutes, description,
                 sent_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session_id,
                jira_issue,
                jira_worklog_id,
                time_spent_minutes,
                description,
                Utc::now(),
                status,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_worklogs_for_session(&self, session_id: i64) -> Result<Vec<JiraWorklog>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, jira_issue, jira_worklog_id, time_spent_minutes, description,
                    sent_at, status
             FROM jira_worklogs WHERE session_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(JiraWorklog {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    jira_issue: row.get(2)?,
                    jira_worklog_id: row.get(3)?,
                    time_spent_minutes: row.get(4)?,
                    description: row.get(5)?,
                    sent_at: row.get(6)?,
                    status: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}
