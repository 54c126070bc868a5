use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub key: String,
    pub summary: String,
    pub description: Option<String>,
    pub status: String,
    pub assignee: Option<String>,
    pub project: String,
    pub issue_type: String,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub project: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub id: String,
    pub name: String,
    pub to_status: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueWorkflow {
    pub issue_key: String,
    pub current_status: String,
    pub project: String,
    pub issue_type: String,
    pub available_transitions: Vec<Transition>,
    pub all_possible_statuses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub key: String,
    pub name: String,
    pub description: String,
    pub lead: String,
}

// ── Wire response shapes ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct IssueResponse {
    pub key: String,
    pub fields: IssueFields,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueFields {
    pub summary: String,
    pub description: Option<String>,
    pub status: StatusField,
    pub assignee: Option<UserField>,
    pub project: ProjectField,
    pub issuetype: IssueTypeField,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserField {
    #[serde(rename = "displayName")]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectField {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub lead: Option<UserField>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IssueTypeField {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    pub issues: Vec<IssueResponse>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionsResponse {
    pub transitions: Vec<TransitionWire>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionWire {
    pub id: String,
    pub name: String,
    pub to: TransitionTo,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TransitionTo {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusWire {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ProjectsResponse {
    pub values: Vec<ProjectField>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddWorklogRequest<'a> {
    #[serde(rename = "timeSpent")]
    pub time_spent: &'a str,
    pub comment: &'a str,
    pub started: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorklogResponse {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct AddCommentRequest<'a> {
    pub body: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransitionRequest<'a> {
    pub transition: TransitionIdRequest<'a>,
}

#[derive(Debug, Serialize)]
pub(crate) struct TransitionIdRequest<'a> {
    pub id: &'a str,
}
