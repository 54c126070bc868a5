use chrono::Utc;
use rusqlite::params;

use crate::errors::StoreError;
use crate::types::{Activity, ActivityType, NewActivity};
use crate::Store;

impl Store {
    pub fn add_activity(
        &self,
        session_id: i64,
        activity_type: ActivityType,
        fields: NewActivity,
    ) -> Result<i64, StoreError> {
        self.conn.execute(
            "INSERT INTO activities
                (session_id, activity_type, file_path, commit_hash, commit_message, timestamp, details)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                session_id,
                activity_type,
                fields.file_path,
                fields.commit_hash,
                fields.commit_message,
                Utc::now(),
                fields.details,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn list_activities_for_session(&self, session_id: i64) -> Result<Vec<Activity>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, activity_type, file_path, commit_hash, commit_message,
                    timestamp, details
             FROM activities WHERE session_id = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![session_id], |row| {
                Ok(Activity {
                    id: row.get(0)?,
                    session_id: row.get(1)?,
                    activity_type: row.get(2)?,
                    file_path: row.get(3)?,
                    commit_hash: row.get(4)?,
                    commit_message: row.get(5)?,
                    timestamp: row.get(6)?,
                    details: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn count_activities_for_session(&self, session_id: i64) -> Result<i64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn count_commits_for_session(&self, session_id: i64) -> Result<i64, StoreError> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM activities WHERE session_id = ?1 AND activity_type = ?2",
            params![session_id, ActivityType::Commit],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Store;

    #[test]
    fn add_then_list_activities_preserves_order() {
        let store = Store::open_in_memory().unwrap();
        let repo_id = store.add_repository("/repo", "repo").unwrap();
        let session_id = store.start_session(repo_id, "main", None, None, None).unwrap();

        store
            .add_activity(session_id, ActivityType::RepoEntered, NewActivity::default())
            .unwrap();
        store
            .add_activity(
                session_id,
                ActivityType::Commit,
                NewActivity {
                    commit_hash: Some("abc123".to_string()),
                    commit_message: Some("fix bug".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        let activities = store.list_activities_for_session(session_id).unwrap();
        assert_eq!(activities.len(), 2);
        assert_eq!(activities[1].commit_hash.as_deref(), Some("abc123"));
        assert_eq!(store.count_commits_for_session(session_id).unwrap(), 1);
    }
}
