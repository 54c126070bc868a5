//! Pure branch-name parsing.
//!
//! Extracts an issue key and structured parts from a branch name. No I/O, no
//! state — every function here is a deterministic transform of its input.

use regex::Regex;
use std::sync::OnceLock;

/// Common branch-type prefixes recognized by [`branch_category`].
pub const COMMON_BRANCH_TYPES: &[&str] = &[
    "feature", "feat", "bugfix", "fix", "hotfix", "release", "chore", "docs", "style", "refactor",
    "test", "perf", "build", "ci",
];

/// The broad category a branch type falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Feature,
    Bugfix,
    Release,
    Maintenance,
    Test,
    Other,
}

/// The parts extracted from a branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchInfo {
    pub original: String,
    pub branch_type: Option<String>,
    pub issue: Option<String>,
    pub description: Option<String>,
    pub valid_issue_format: bool,
}

struct Pattern {
    regex: &'static OnceLock<Regex>,
    source: &'static str,
}

fn compiled(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static branch pattern must compile"))
}

fn patterns() -> [Pattern; 6] {
    static P1: OnceLock<Regex> = OnceLock::new();
    static P2: OnceLock<Regex> = OnceLock::new();
    static P3: OnceLock<Regex> = OnceLock::new();
    static P4: OnceLock<Regex> = OnceLock::new();
    static P5: OnceLock<Regex> = OnceLock::new();
    static P6: OnceLock<Regex> = OnceLock::new();
    [
        Pattern {
            regex: &P1,
            source: r"(?i)^(?P<type>[^/]+)/(?P<issue>[a-z]+-\d+)-(?P<desc>.+)$",
        },
        Pattern {
            regex: &P2,
            source: r"(?i)^(?P<type>[^/]+)/(?P<issue>[a-z]+-\d+)$",
        },
        Pattern {
            regex: &P3,
            source: r"(?i)^(?P<issue>[a-z]+-\d+)-(?P<desc>.+)$",
        },
        Pattern {
            regex: &P4,
            source: r"(?i)^(?P<issue>[a-z]+-\d+)$",
        },
        Pattern {
            regex: &P5,
            source: r"(?i)^(?P<type>[^/]+)/(?P<issue>[a-z]+\d+)$",
        },
        Pattern {
            regex: &P6,
            source: r"(?i)^(?P<issue>[a-z]+\d+)$",
        },
    ]
}

fn is_valid_issue_format(issue: &str) -> bool {
    static CELL: OnceLock<Regex> = OnceLock::new();
    compiled(&CELL, r"^[A-Z]+-?\d+$").is_match(issue)
}

fn normalize_description(desc: &str) -> String {
    desc.chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect()
}

/// Parse a branch name, trying each pattern in order and taking the first match.
///
/// An empty branch name yields a [`BranchInfo`] with everything unset.
pub fn parse_branch(branch_name: &str) -> BranchInfo {
    if branch_name.is_empty() {
        return BranchInfo {
            original: String::new(),
            branch_type: None,
            issue: None,
            description: None,
            valid_issue_format: false,
        };
    }

    for pattern in patterns() {
        let regex = compiled(pattern.regex, pattern.source);
        let Some(captures) = regex.captures(branch_name) else {
            continue;
        };

        let branch_type = captures.name("type").map(|m| m.as_str().to_lowercase());
        let issue = captures.name("issue").map(|m| m.as_str().to_uppercase());
        let description = captures
            .name("desc")
            .map(|m| normalize_description(m.as_str()));
        let valid_issue_format = issue.as_deref().is_some_and(is_valid_issue_format);

        return BranchInfo {
            original: branch_name.to_string(),
            branch_type,
            issue,
            description,
            valid_issue_format,
        };
    }

    BranchInfo {
        original: branch_name.to_string(),
        branch_type: None,
        issue: None,
        description: None,
        valid_issue_format: false,
    }
}

/// Extract the issue key from a branch name, if it is present and well-formed.
pub fn extract_issue(branch_name: &str) -> Option<String> {
    let info = parse_branch(branch_name);
    if info.valid_issue_format { info.issue } else { None }
}

/// Classify a branch's type into a broad category.
///
/// Branches with no recognized type (or no type at all) fall into `Other`.
pub fn branch_category(info: &BranchInfo) -> Category {
    let Some(branch_type) = info.branch_type.as_deref() else {
        return Category::Other;
    };

    match branch_type {
        "feature" | "feat" => Category::Feature,
        "bugfix" | "fix" | "hotfix" => Category::Bugfix,
        "release" => Category::Release,
        "chore" | "docs" | "style" | "refactor" => Category::Maintenance,
        "test" => Category::Test,
        _ => Category::Other,
    }
}

/// Suggest a branch name for an issue, e.g. `feature/PROJ-123-login-page`.
///
/// `branch_type` is normalized to lowercase and falls back to `"feature"`
/// when it isn't one of [`COMMON_BRANCH_TYPES`]. Returns an empty string if
/// `jira_issue` is empty.
pub fn suggest_branch_name(jira_issue: &str, branch_type: &str, description: &str) -> String {
    if jira_issue.is_empty() {
        return String::new();
    }

    let branch_type = branch_type.to_lowercase();
    let branch_type = if COMMON_BRANCH_TYPES.contains(&branch_type.as_str()) {
        branch_type
    } else {
        "feature".to_string()
    };

    if description.is_empty() {
        return format!("{branch_type}/{jira_issue}");
    }

    static NON_ALNUM: OnceLock<Regex> = OnceLock::new();
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let cleaned = compiled(&NON_ALNUM, r"[^a-zA-Z0-9\s]").replace_all(description, "");
    let slug = compiled(&WHITESPACE, r"\s+")
        .replace_all(cleaned.trim(), "-")
        .to_lowercase();

    format!("{branch_type}/{jira_issue}-{slug}")
}
