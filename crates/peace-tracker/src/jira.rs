use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use reqwest::blocking::Client;
use tracing::{debug, error, info, warn};

use crate::tracker::IssueTracker;
use crate::types::{
    AddCommentRequest, AddWorklogRequest, Issue, IssueResponse, IssueSummary, IssueWorkflow,
    Project, SearchResponse, StatusWire, Transition, TransitionIdRequest, TransitionRequest,
    TransitionsResponse, WorklogResponse,
};
use crate::types::ProjectsResponse;

/// A Jira Cloud REST API (v3) client, authenticated with HTTP basic auth
/// (email + API token).
pub struct JiraClient {
    base_url: String,
    username: String,
    api_token: String,
    http: Client,
    authenticated: AtomicBool,
}

impl JiraClient {
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            username: username.into(),
            api_token: api_token.into(),
            http: Client::new(),
            authenticated: AtomicBool::new(false),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/api/3{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .request(method, self.url(path))
            .basic_auth(&self.username, Some(&self.api_token))
    }
}

impl IssueTracker for JiraClient {
    fn connect(&self) -> bool {
        let response = self.request(reqwest::Method::GET, "/myself").send();

        let ok = match response {
            Ok(resp) if resp.status().is_success() => true,
            Ok(resp) => {
                error!(event = "tracker.jira.connect_rejected", status = %resp.status());
                false
            }
            Err(e) => {
                error!(event = "tracker.jira.connect_failed", error = %e);
                false
            }
        };

        self.authenticated.store(ok, Ordering::SeqCst);
        if ok {
            info!(event = "tracker.jira.connected", base_url = %self.base_url);
        }
        ok
    }

    fn is_connected(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn get_issue(&self, key: &str) -> Option<Issue> {
        if !self.is_connected() {
            warn!(event = "tracker.jira.not_connected", operation = "get_issue");
            return None;
        }

        let response = self
            .request(reqwest::Method::GET, &format!("/issue/{key}"))
            .send()
            .ok()?;

        if !response.status().is_success() {
            if response.status() == reqwest::StatusCode::NOT_FOUND {
                warn!(event = "tracker.jira.issue_not_found", key = %key);
            } else {
                error!(event = "tracker.jira.get_issue_failed", key = %key, status = %response.status());
            }
            return None;
        }

        let parsed: IssueResponse = response.json().ok()?;
        Some(Issue {
            key: parsed.key,
            summary: parsed.fields.summary,
            description: parsed.fields.description,
            status: parsed.fields.status.name,
            assignee: parsed.fields.assignee.map(|a| a.display_name),
            project: parsed.fields.project.key,
            issue_type: parsed.fields.issuetype.name,
            created: parsed.fields.created,
            updated: parsed.fields.updated,
        })
    }

    fn add_worklog(
        &self,
        key: &str,
        time_spent: &str,
        comment: &str,
        started: Option<DateTime<Utc>>,
    ) -> Option<String> {
        if !self.is_connected() {
            warn!(event = "tracker.jira.not_connected", operation = "add_worklog");
            return None;
        }

        let started = started.unwrap_or_else(Utc::now);
        let body = AddWorklogRequest {
            time_spent,
            comment,
            started: started.format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string(),
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/issue/{key}/worklog"))
            .json(&body)
            .send()
            .ok()?;

        if !response.status().is_success() {
            error!(event = "tracker.jira.add_worklog_failed", key = %key, status = %response.status());
            return None;
        }

        let parsed: WorklogResponse = response.json().ok()?;
        info!(event = "tracker.jira.worklog_added", key = %key, time_spent = %time_spent);
        Some(parsed.id)
    }

    fn add_comment(&self, key: &str, body: &str) -> bool {
        if !self.is_connected() {
            warn!(event = "tracker.jira.not_connected", operation = "add_comment");
            return false;
        }

        let request = AddCommentRequest { body };
        let response = self
            .request(reqwest::Method::POST, &format!("/issue/{key}/comment"))
            .json(&request)
            .send();

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!(event = "tracker.jira.comment_added", key = %key);
                true
            }
            Ok(resp) => {
                error!(event = "tracker.jira.add_comment_failed", key = %key, status = %resp.status());
                false
            }
            Err(e) => {
                error!(event = "tracker.jira.add_comment_failed", key = %key, error = %e);
                false
            }
        }
    }

    fn search(&self, jql: &str, max_results: u32) -> Vec<IssueSummary> {
        if !self.is_connected() {
            return Vec::new();
        }

        let response = self
            .request(reqwest::Method::GET, "/search")
            .query(&[("jql", jql), ("maxResults", &max_results.to_string())])
            .send();

        let Ok(response) = response else {
            error!(event = "tracker.jira.search_failed", jql = %jql);
            return Vec::new();
        };

        if !response.status().is_success() {
            error!(event = "tracker.jira.search_failed", jql = %jql, status = %response.status());
            return Vec::new();
        }

        let Ok(parsed) = response.json::<SearchResponse>() else {
            return Vec::new();
        };

        parsed
            .issues
            .into_iter()
            .map(|issue| IssueSummary {
                key: issue.key,
                summary: issue.fields.summary,
                status: issue.fields.status.name,
                assignee: issue.fields.assignee.map(|a| a.display_name),
                project: issue.fields.project.key,
            })
            .collect()
    }

    fn my_issues(&self, status_filter: Option<&str>) -> Vec<IssueSummary> {
        let mut jql = "assignee = currentUser()".to_string();
        if let Some(status) = status_filter {
            jql.push_str(&format!(" AND status = '{status}'"));
        }
        jql.push_str(" ORDER BY updated DESC");
        self.search(&jql, 50)
    }

    fn list_transitions(&self, key: &str) -> Vec<Transition> {
        if !self.is_connected() {
            return Vec::new();
        }

        let Ok(response) = self
            .request(reqwest::Method::GET, &format!("/issue/{key}/transitions"))
            .send()
        else {
            return Vec::new();
        };

        if !response.status().is_success() {
            error!(event = "tracker.jira.list_transitions_failed", key = %key, status = %response.status());
            return Vec::new();
        }

        let Ok(parsed) = response.json::<TransitionsResponse>() else {
            return Vec::new();
        };

        parsed
            .transitions
            .into_iter()
            .map(|t| Transition {
                id: t.id,
                name: t.name,
                to_status: t.to.name,
            })
            .collect()
    }

    fn transition(&self, key: &str, target_status_name: &str) -> bool {
        if !self.is_connected() {
            warn!(event = "tracker.jira.not_connected", operation = "transition");
            return false;
        }

        let transitions = self.list_transitions(key);
        let target = transitions
            .iter()
            .find(|t| t.to_status.eq_ignore_ascii_case(target_status_name));

        let Some(target) = target else {
            let available: Vec<&str> = transitions.iter().map(|t| t.to_status.as_str()).collect();
            error!(
                event = "tracker.jira.transition_unavailable",
                key = %key,
                target = %target_status_name,
                available = ?available
            );
            return false;
        };

        let body = TransitionRequest {
            transition: TransitionIdRequest { id: &target.id },
        };

        let response = self
            .request(reqwest::Method::POST, &format!("/issue/{key}/transitions"))
            .json(&body)
            .send();

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!(event = "tracker.jira.transitioned", key = %key, target = %target_status_name);
                true
            }
            Ok(resp) => {
                error!(event = "tracker.jira.transition_failed", key = %key, status = %resp.status());
                false
            }
            Err(e) => {
                error!(event = "tracker.jira.transition_failed", key = %key, error = %e);
                false
            }
        }
    }

    fn list_projects(&self) -> Vec<Project> {
        if !self.is_connected() {
            return Vec::new();
        }

        let Ok(response) = self.request(reqwest::Method::GET, "/project/search").send() else {
            return Vec::new();
        };

        if !response.status().is_success() {
            return Vec::new();
        }

        let Ok(parsed) = response.json::<ProjectsResponse>() else {
            return Vec::new();
        };

        parsed
            .values
            .into_iter()
            .map(|p| Project {
                key: p.key,
                name: p.name,
                description: p.description,
                lead: p.lead.map(|l| l.display_name).unwrap_or_default(),
            })
            .collect()
    }

    /// Jira's transitions-by-project endpoint is unreliable across server
    /// versions, so this falls back to the server-wide status list.
    fn list_project_statuses(&self, _project_key: &str) -> Vec<String> {
        self.list_all_statuses()
    }

    fn list_all_statuses(&self) -> Vec<String> {
        if !self.is_connected() {
            return Vec::new();
        }

        let Ok(response) = self.request(reqwest::Method::GET, "/status").send() else {
            return Vec::new();
        };

        if !response.status().is_success() {
            return Vec::new();
        }

        let Ok(parsed) = response.json::<Vec<StatusWire>>() else {
            return Vec::new();
        };

        let mut names: Vec<String> = parsed.into_iter().map(|s| s.name).collect();
        names.sort();
        names.dedup();
        names
    }

    fn issue_workflow(&self, key: &str) -> Option<IssueWorkflow> {
        let issue = self.get_issue(key)?;
        let transitions = self.list_transitions(key);

        let mut seen = std::collections::HashSet::new();
        let all_possible_statuses: Vec<String> = transitions
            .iter()
            .map(|t| t.to_status.clone())
            .chain(std::iter::once(issue.status.clone()))
            .filter(|status| seen.insert(status.clone()))
            .collect();

        debug!(event = "tracker.jira.workflow_fetched", key = %key);

        Some(IssueWorkflow {
            issue_key: key.to_string(),
            current_status: issue.status,
            project: issue.project,
            issue_type: issue.issue_type,
            available_transitions: transitions,
            all_possible_statuses,
        })
    }
}
