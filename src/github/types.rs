use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A GitHub account as embedded in repository, pull request and review records.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub login: String,
}

/// Repository descriptor from `GET /user/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Repository {
    pub name: String,
    /// `owner/name`
    pub full_name: String,
    pub owner: User,
}

/// Pull request record from `GET /repos/{owner}/{repo}/pulls`.
/// Only the fields the pipeline consumes are deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    /// `null` for pull requests opened by deleted accounts.
    pub user: Option<User>,
    pub created_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub requested_reviewers: Vec<User>,
}

impl PullRequest {
    pub fn author_login(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.login.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Pending,
    Dismissed,
    #[serde(other)]
    Unknown,
}

impl ReviewState {
    /// Only approvals and change requests count as a submitted review.
    pub fn is_decisive(self) -> bool {
        matches!(self, ReviewState::Approved | ReviewState::ChangesRequested)
    }
}

/// Review record from `GET /repos/{owner}/{repo}/pulls/{number}/reviews`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Review {
    pub user: Option<User>,
    pub state: ReviewState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_request_deserialize_minimal() {
        let pr: PullRequest = serde_json::from_value(serde_json::json!({
            "number": 7,
            "title": "Fix login",
            "body": null,
            "html_url": "https://github.com/org/a/pull/7",
            "state": "open",
            "user": { "login": "alice", "id": 1 },
            "created_at": "2024-05-01T10:00:00Z",
            "merged_at": null
        }))
        .unwrap();
        assert_eq!(pr.number, 7);
        assert_eq!(pr.author_login(), Some("alice"));
        assert!(pr.body.is_none());
        assert!(pr.requested_reviewers.is_empty());
    }

    #[test]
    fn test_review_state_parsing() {
        let states: Vec<ReviewState> =
            serde_json::from_str(r#"["APPROVED","CHANGES_REQUESTED","COMMENTED","SOMETHING_NEW"]"#)
                .unwrap();
        assert_eq!(
            states,
            vec![
                ReviewState::Approved,
                ReviewState::ChangesRequested,
                ReviewState::Commented,
                ReviewState::Unknown,
            ]
        );
        assert!(ReviewState::Approved.is_decisive());
        assert!(ReviewState::ChangesRequested.is_decisive());
        assert!(!ReviewState::Commented.is_decisive());
        assert!(!ReviewState::Pending.is_decisive());
    }
}
