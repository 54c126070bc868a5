use chrono::Utc;
use rusqlite::{OptionalExtension, params};

use crate::errors::StoreError;
use crate::types::Repository;
use crate::Store;

impl Store {
    /// Register a repository, returning its id.
    pub fn add_repository(&self, path: &str, name: &str) -> Result<i64, StoreError> {
        let now = Utc::now();
        self.conn.execute(
            "INSERT INTO repositories (path, name, is_active, created_at) VALUES (?1, ?2, 1, ?3)",
            params![path, name, now],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn get_repository_by_path(&self, path: &str) -> Result<Option<Repository>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, path, name, is_active, created_at, last_activity
                 FROM repositories WHERE path = ?1",
                params![path],
                Self::row_to_repository,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn get_repository_by_id(&self, id: i64) -> Result<Option<Repository>, StoreError> {
        self.conn
            .query_row(
                "SELECT id, path, name, is_active, created_at, last_activity
                 FROM repositories WHERE id = ?1",
                params![id],
                Self::row_to_repository,
            )
            .optional()
            .map_err(StoreError::from)
    }

    pub fn list_repositories(&self) -> Result<Vec<Repository>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, name, is_active, created_at, last_activity
             FROM repositories ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], Self::row_to_repository)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn toggle_repository_active(&self, id: i64, active: bool) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE repositories SET is_active = ?1 WHERE id = ?2",
            params![active, id],
        )?;
        Ok(())
    }

    pub fn touch_repository_activity(&self, id: i64) -> Result<(), StoreError> {
        self.conn.execute(
            "UPDATE repositories SET last_activity = ?1 WHERE id = ?2",
            params![Utc::now(), id],
        )?;
        Ok(())
    }

    fn row_to_repository(row: &rusqlite::Row) -> rusqlite::Result<Repository> {
        Ok(Repository {
            id: row.get(0)?,
            path: row.get(1)?,
            name: row.get(2)?,
            is_active: row.get(3)?,
            created_at: row.get(4)?,
            last_activity: row.get(5)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Store;

    #[test]
    fn add_then_get_repository_round_trips() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_repository("/repo/a", "a").unwrap();

        let by_id = store.get_repository_by_id(id).unwrap().unwrap();
        assert_eq!(by_id.path, "/repo/a");
        assert!(by_id.is_active);

        let by_path = store.get_repository_by_path("/repo/a").unwrap().unwrap();
        assert_eq!(by_path.id, id);
    }

    #[test]
    fn toggle_active_flips_flag() {
        let store = Store::open_in_memory().unwrap();
        let id = store.add_repository("/repo/b", "b").unwrap();
        store.toggle_repository_active(id, false).unwrap();

        let repo = store.get_repository_by_id(id).unwrap().unwrap();
        assert!(!repo.is_active);
    }

    #[test]
    fn list_repositories_returns_all() {
        let store = Store::open_in_memory().unwrap();
        store.add_repository("/repo/a", "a").unwrap();
        store.add_repository("/repo/b", "b").unwrap();

        assert_eq!(store.list_repositories().unwrap().len(), 2);
    }
}
