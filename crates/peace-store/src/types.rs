//! Domain records persisted by the store. Field names and tables mirror the
//! original schema; `original_jira_status`/`current_jira_status` are the
//! forward-only migration columns added to `work_sessions`.

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: i64,
    pub path: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Completed,
    Orphaned,
}

impl SessionStatus {
    fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Orphaned => "orphaned",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "active" => Some(SessionStatus::Active),
            "completed" => Some(SessionStatus::Completed),
            "orphaned" => Some(SessionStatus::Orphaned),
            _ => None,
        }
    }
}

impl ToSql for SessionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for SessionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        SessionStatus::from_str(text).ok_or(FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkSession {
    pub id: i64,
    pub repository_id: i64,
    pub branch_name: String,
    pub jira_issue: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub total_minutes: i64,
    pub is_active: bool,
    pub jira_worklog_id: Option<String>,
    pub status: SessionStatus,
    pub original_jira_status: Option<String>,
    pub current_jira_status: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivityType {
    FileModified,
    Commit,
    RepoEntered,
    BranchChanged,
}

impl ActivityType {
    fn as_str(&self) -> &'static str {
        match self {
            ActivityType::FileModified => "file_modified",
            ActivityType::Commit => "commit",
            ActivityType::RepoEntered => "repo_entered",
            ActivityType::BranchChanged => "branch_changed",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "file_modified" => Some(ActivityType::FileModified),
            "commit" => Some(ActivityType::Commit),
            "repo_entered" => Some(ActivityType::RepoEntered),
            "branch_changed" => Some(ActivityType::BranchChanged),
            _ => None,
        }
    }
}

impl ToSql for ActivityType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for ActivityType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        ActivityType::from_str(text).ok_or(FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activity {
    pub id: i64,
    pub session_id: i64,
    pub activity_type: ActivityType,
    pub file_path: Option<String>,
    pub commit_hash: Option<String>,
    pub commit_message: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub details: Option<String>,
}

/// Fields an activity may carry, passed to [`crate::Store::add_activity`].
#[derive(Debug, Clone, Default)]
pub struct NewActivity {
    pub file_path: Option<String>,
    pub commit_hash: Option<String>,
    pub commit_message: Option<String>,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorklogStatus {
    Sent,
    Failed,
    Pending,
}

impl WorklogStatus {
    fn as_str(&self) -> &'static str {
        match self {
            WorklogStatus::Sent => "sent",
            WorklogStatus::Failed => "failed",
            WorklogStatus::Pending => "pending",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "sent" => Some(WorklogStatus::Sent),
            "failed" => Some(WorklogStatus::Failed),
            "pending" => Some(WorklogStatus::Pending),
            _ => None,
        }
    }
}

impl ToSql for WorklogStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for WorklogStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        WorklogStatus::from_str(text).ok_or(FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraWorklog {
    pub id: i64,
    pub session_id: i64,
    pub jira_issue: String,
    pub jira_worklog_id: String,
    pub time_spent_minutes: i64,
    pub description: String,
    pub sent_at: DateTime<Utc>,
    pub status: WorklogStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanStatus {
    Orphaned,
    Assigned,
}

impl OrphanStatus {
    fn as_str(&self) -> &'static str {
        match self {
            OrphanStatus::Orphaned => "orphaned",
            OrphanStatus::Assigned => "assigned",
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "orphaned" => Some(OrphanStatus::Orphaned),
            "assigned" => Some(OrphanStatus::Assigned),
            _ => None,
        }
    }
}

impl ToSql for OrphanStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for OrphanStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        OrphanStatus::from_str(text).ok_or(FromSqlError::InvalidType)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanRecord {
    pub id: i64,
    pub session_id: i64,
    pub branch_name: String,
    pub total_minutes: i64,
    pub activities_count: i64,
    pub created_at: DateTime<Utc>,
    pub assigned_issue: Option<String>,
    pub status: OrphanStatus,
}
