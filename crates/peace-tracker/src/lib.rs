//! Issue-tracker client for dev-peace: a typed, fail-soft façade over a
//! remote Jira-compatible tracker.

mod duration;
pub mod errors;
mod jira;
mod null;
mod tracker;
pub mod types;

pub use duration::{format_time_spent, parse_time_spent};
pub use errors::TrackerError;
pub use jira::JiraClient;
pub use null::NullTracker;
pub use tracker::IssueTracker;
pub use types::{Issue, IssueSummary, IssueWorkflow, Project, Transition};
