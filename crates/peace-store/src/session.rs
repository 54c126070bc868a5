use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::errors::StoreError;
use crate::types::{SessionStatus, WorkSession};
use crate::Store;

impl Store {
    /// Open a new active session for `repository_id` on `branch`.
    #[allow(clippy::too_many_arguments)]
    pub fn start_session(
        &self,
        repository_id: i64,
        branch: &str,
        issue: Option<&str>,
        original_status: Option<&str>,
        current_status: Option<&str>,
    ) -> Result<i64, StoreError> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO work_sessions
                (repository_id, branch_name, jira_issue, start_time, is_active, status,
                 original_jira_status, current_jira_status)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6, ?7)",
            params![
                repository_id,
                branch,
                issue,
                now,
                SessionStatus::Active,
                original_status,
                current_status,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Mark a session completed, computing `total_minutes` from
    /// `now - start_time`.
    pub fn end_session(&self, id: i64) -> Result<(), StoreError> {
        let session = self
            .get_session(id)?
            .ok_or(StoreError::SessionNotFound { id })?;

        let now = Utc::now();
        let minutes = (now - session.start_time).num_minutes().max(0);

        self.conn.execute(
            "UPDATE work_sessions
             SET end_time = ?1, total_minutes = ?2, is_active = 0, status = ?3
             WHERE id = ?4",
            params![now, minutes, SessionStatus::Completed, id],
        )?;
        Ok(())
    }

    pub fn get_session(&self, id: i64) -> Result<Option<WorkSession>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, repository_id, branch_name, jira_issue, start_time, end_time,
                        total_minutes, is_active, jira_worklog_id, status,
                        original_jira_status, current_jira_status
                 FROM work_sessions WHERE id = ?1",
                params![id],
                Self::row_to_session,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn get_active_session_for_repo(
        &self,
        repository_id: i64,
    ) -> Result<Option<WorkSession>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, repository_id, branch_name, jira_issue, start_time, end_time,
                        total_minutes, is_active, jira_worklog_id, status,
                        original_jira_status, current_jira_status
                 FROM work_sessions WHERE repository_id = ?1 AND is_active = 1",
                params![repository_id],
                Self::row_to_session,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn list_active_sessions(&self) -> Result<Vec<WorkSession>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, repository_id, branch_name, jira_issue, start_time, end_time,
                    total_minutes, is_active, jira_worklog_id, status,
                    original_jira_status, current_jira_status
             FROM work_sessions WHERE is_active = 1",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_session)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Patch the remembered Jira status fields. `None` leaves a field
    /// unchanged.
    pub fn update_session_jira_status(
        &self,
        id: i64,
        original_status: Option<&str>,
        current_status: Option<&str>,
    ) -> Result<(), StoreError> {
        if let Some(status) = original_status {
            self.conn.execute(
                "UPDATE work_sessions SET original_jira_status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
        }
        if let Some(status) = current_status {
            self.conn.execute(
                "UPDATE work_sessions SET current_jira_status = ?1 WHERE id = ?2",
                params![status, id],
            )?;
        }
        Ok(())
    }

    pub fn set_session_worklog_id(&self, id: i64, worklog_id: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE work_sessions SET jira_worklog_id = ?1 WHERE id = ?2",
            params![worklog_id, id],
        )?;
        Ok(())
    }

    pub fn mark_session_orphaned(&self, id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE work_sessions SET status = ?1 WHERE id = ?2",
            params![SessionStatus::Orphaned, id],
        )?;
        Ok(())
    }

    fn row_to_session(row: &rusqlite::Row) -> rusqlite::Result<WorkSession> {
        Ok(WorkSession {
            id: row.get(0)?,
            repository_id: row.get(1)?,
            branch_name: row.get(2)?,
            jira_issue: row.get(3)?,
            start_time: row.get(4)?,
            end_time: row.get(5)?,
            total_minutes: row.get(6)?,
            is_active: row.get(7)?,
            jira_worklog_id: row.get(8)?,
            status: row.get(9)?,
            original_jira_status: row.get(10)?,
            current_jira_status: row.get(11)?,
        })
    }
}
