//! Worklog description synthesis (§4.7): groups a session's activities into
//! a short human-readable summary attached to the worklog entry.

use peace_store::{Activity, ActivityType};

/// Build a worklog description from a session's activities.
///
/// Returns `None` when there are no activities at all — the caller falls
/// back to the configured `worklog_description_template` in that case
/// rather than suppressing the worklog outright.
pub fn synthesize_description(activities: &[Activity]) -> Option<String> {
    if activities.is_empty() {
        return None;
    }

    let file_count = activities
        .iter()
        .filter(|a| a.activity_type == ActivityType::FileModified)
        .count();
    let commit_count = activities
        .iter()
        .filter(|a| a.activity_type == ActivityType::Commit)
        .count();

    let mut lines = vec![
        "Development session".to_string(),
        format!("- {file_count} file(s) modified"),
        format!("- {commit_count} commit(s) made"),
    ];

    let recent_messages: Vec<&str> = activities
        .iter()
        .rev()
        .filter(|a| a.activity_type == ActivityType::Commit)
        .filter_map(|a| a.commit_message.as_deref())
        .take(3)
        .collect();

    for message in recent_messages {
        let first_line = message.lines().next().unwrap_or(message);
        lines.push(format!("- {first_line}"));
    }

    Some(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn activity(activity_type: ActivityType, commit_message: Option<&str>) -> Activity {
        Activity {
            id: 0,
            session_id: 0,
            activity_type,
            file_path: None,
            commit_hash: None,
            commit_message: commit_message.map(str::to_string),
            timestamp: Utc::now(),
            details: None,
        }
    }

    #[test]
    fn no_activities_yields_none() {
        assert_eq!(synthesize_description(&[]), None);
    }

    #[test]
    fn counts_files_and_commits() {
        let activities = vec![
            activity(ActivityType::RepoEntered, None),
            activity(ActivityType::FileModified, None),
            activity(ActivityType::FileModified, None),
            activity(ActivityType::Commit, Some("fix login bug")),
        ];
        let description = synthesize_description(&activities).unwrap();
        assert!(description.contains("2 file(s) modified"));
        assert!(description.contains("1 commit(s) made"));
        assert!(description.contains("fix login bug"));
    }

    #[test]
    fn keeps_only_three_most_recent_commit_messages() {
        let activities = vec![
            activity(ActivityType::Commit, Some("first")),
            activity(ActivityType::Commit, Some("second")),
            activity(ActivityType::Commit, Some("third")),
            activity(ActivityType::Commit, Some("fourth")),
        ];
        let description = synthesize_description(&activities).unwrap();
        assert!(description.contains("fourth"));
        assert!(description.contains("third"));
        assert!(description.contains("second"));
        assert!(!description.contains("first)"));
    }

    #[test]
    fn multi_line_commit_message_uses_first_line_only() {
        let activities = vec![activity(ActivityType::Commit, Some("fix login\n\nreason: race"))];
        let description = synthesize_description(&activities).unwrap();
        assert!(description.contains("fix login"));
        assert!(!description.contains("reason: race"));
    }
}
