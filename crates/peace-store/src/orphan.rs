use chrono::Utc;
use rusqlite::params;

use crate::errors::StoreError;
use crate::types::OrphanRecord;
use crate::types::OrphanStatus;
use crate::Store;

impl Store {
    /// Snapshot a session's activity count and duration into an orphan
    /// record, for a session whose branch carried no recognizable issue key.
    pub fn create_orphan(&self, session_id: i64, branch_name: &str) -> Result<i64, StoreError> {
        let session = self
            .get_session(session_id)?
            .ok_or(StoreError::SessionNotFound { id: session_id })?;
        let activities_count = self.count_activities_for_session(session_id)?;

        self.conn.execute(
            "INSERT INTO orphan_records
                (session_id, branch_name, total_minutes, activities_count, created_at, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                session_id,
                branch_name,
                session.total_minutes,
                activities_count,
                Utc::now(),
                OrphanStatus::Orphaned,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_unassigned_orphans(&self) -> Result<Vec<OrphanRecord>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, branch_name, total_minutes, activities_count, created_at,
                    assigned_issue, status
             FROM orphan_records WHERE status = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![OrphanStatus::Orphaned], Self::row_to_orphan)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn assign_orphan(&self, id: i64, issue_key: &str) -> Result<(), StoreError> {
        let updated = self.conn.execute(
            "UPDATE orphan_records SET assigned_issue = ?1, status = ?2 WHERE id = ?3",
            params![issue_key, OrphanStatus::Assigned, id],
        )?;
        if updated == 0 {
            return Err(StoreError::OrphanNotFound { id });
        }
        Ok(())
    }

    pub fn delete_orphan(&self, id: i64) -> Result<(), StoreError> {
        let updated = self
            .conn
            .execute("DELETE FROM orphan_records WHERE id = ?1", params![id])?;
        if updated == 0 {
            return Err(StoreError::OrphanNotFound { id });
        }
        Ok(())
    }

    fn row_to_orphan(row: &rusqlite::Row) -> rusqlite::Result<OrphanRecord> {
        Ok(OrphanRecord {
            id: row.get(0)?,
            session_id: row.get(1)?,
            branch_name: row.get(2)?,
            total_minutes: row.get(3)?,
            activities_count: row.get(4)?,
            created_at: row.get(5)?,
            assigned_issue: row.get(6)?,
            status: row.get(7)?,
        })
    }
}
