//! Embedded persistence store for dev-peace, backed by SQLite via `rusqlite`.
//!
//! All writes are expected to come from the single session-manager consumer
//! (see the concurrency model); this crate performs no internal locking
//! beyond what SQLite itself provides.

mod activity;
pub mod errors;
mod orphan;
mod repo;
mod schema;
mod session;
pub mod types;
mod worklog;

use std::path::Path;

use rusqlite::Connection;

pub use errors::StoreError;
pub use types::{
    Activity, ActivityType, JiraWorklog, NewActivity, OrphanRecord, OrphanStatus, Repository,
    SessionStatus, WorkSession, WorklogStatus,
};

pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (creating if absent) the database file at `path`, applying
    /// schema creation and migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database. Used by tests and short-lived tooling.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::init(&conn)?;
        Ok(Self { conn })
    }
}
