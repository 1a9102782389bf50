use chrono::{DateTime, Utc};

use crate::github::PullRequest;

/// Keep pull requests opened by `username`, in source order.
pub fn select_open_by_author(prs: Vec<PullRequest>, username: &str) -> Vec<PullRequest> {
    prs.into_iter()
        .filter(|pr| pr.author_login() == Some(username))
        .collect()
}

/// Keep pull requests opened by `username` that were merged strictly after `cutoff`.
/// Closed-but-unmerged pull requests are dropped.
pub fn select_merged_by_author_and_window(
    prs: Vec<PullRequest>,
    username: &str,
    cutoff: DateTime<Utc>,
) -> Vec<PullRequest> {
    prs.into_iter()
        .filter(|pr| pr.author_login() == Some(username))
        .filter(|pr| pr.merged_at.is_some_and(|merged_at| merged_at > cutoff))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::types::User;
    use chrono::Duration;

    fn pr(number: u64, author: Option<&str>, merged_at: Option<DateTime<Utc>>) -> PullRequest {
        PullRequest {
            number,
            title: format!("PR {number}"),
            body: None,
            html_url: format!("https://github.com/org/a/pull/{number}"),
            user: author.map(|login| User {
                login: login.to_string(),
            }),
            created_at: Utc::now(),
            merged_at,
            requested_reviewers: vec![],
        }
    }

    fn numbers(prs: &[PullRequest]) -> Vec<u64> {
        prs.iter().map(|pr| pr.number).collect()
    }

    #[test]
    fn test_select_open_by_author_preserves_order() {
        let prs = vec![
            pr(3, Some("alice"), None),
            pr(1, Some("bob"), None),
            pr(2, Some("alice"), None),
            pr(4, None, None),
        ];
        assert_eq!(numbers(&select_open_by_author(prs, "alice")), vec![3, 2]);
    }

    #[test]
    fn test_select_open_by_author_is_case_sensitive() {
        let prs = vec![pr(1, Some("Alice"), None)];
        assert!(select_open_by_author(prs, "alice").is_empty());
    }

    #[test]
    fn test_select_merged_window() {
        let now = Utc::now();
        let cutoff = now - Duration::weeks(1);
        let prs = vec![
            pr(1, Some("alice"), Some(now - Duration::days(2))),
            pr(2, Some("alice"), Some(now - Duration::days(9))),
            pr(3, Some("alice"), None),
            pr(4, Some("bob"), Some(now - Duration::days(1))),
            pr(5, Some("alice"), Some(cutoff)),
        ];
        assert_eq!(
            numbers(&select_merged_by_author_and_window(prs, "alice", cutoff)),
            vec![1]
        );
    }
}
