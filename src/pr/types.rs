use chrono::{DateTime, Duration, Utc};

use crate::github;

pub const NO_DESCRIPTION: &str = "No description provided";

/// Read-only projection of a remote pull request authored by the tracked user.
/// Identity is `(repository, number)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestSummary {
    pub title: String,
    /// PR body, or [`NO_DESCRIPTION`] when GitHub has none.
    pub description: String,
    pub url: String,
    /// `owner/name`
    pub repository: String,
    pub number: u64,
    pub status: PrStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrStatus {
    Open {
        created_at: DateTime<Utc>,
        /// Logins with an approving or change-requesting review, first review first.
        reviewers: Vec<String>,
        /// Logins currently asked to review.
        requested_reviewers: Vec<String>,
    },
    Merged {
        merged_at: DateTime<Utc>,
    },
}

impl PullRequestSummary {
    /// Build an open summary. `reviews` are the PR's submitted reviews.
    pub fn open(pr: github::PullRequest, repository: &str, reviews: &[github::Review]) -> Self {
        let mut reviewers: Vec<String> = Vec::new();
        for review in reviews.iter().filter(|r| r.state.is_decisive()) {
            if let Some(user) = &review.user {
                if !reviewers.contains(&user.login) {
                    reviewers.push(user.login.clone());
                }
            }
        }
        let requested_reviewers = pr
            .requested_reviewers
            .iter()
            .map(|user| user.login.clone())
            .collect();

        let status = PrStatus::Open {
            created_at: pr.created_at,
            reviewers,
            requested_reviewers,
        };
        Self::from_raw(pr, repository, status)
    }

    /// Build a merged summary. Returns `None` for closed-but-unmerged PRs.
    pub fn merged(pr: github::PullRequest, repository: &str) -> Option<Self> {
        let merged_at = pr.merged_at?;
        Some(Self::from_raw(pr, repository, PrStatus::Merged { merged_at }))
    }

    fn from_raw(pr: github::PullRequest, repository: &str, status: PrStatus) -> Self {
        Self {
            title: pr.title,
            description: pr
                .body
                .filter(|body| !body.is_empty())
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            url: pr.html_url,
            repository: repository.to_string(),
            number: pr.number,
            status,
        }
    }

    /// Canonical `https://github.com/{owner/name}/pull/{number}` link.
    pub fn pull_link(&self) -> String {
        format!("https://github.com/{}/pull/{}", self.repository, self.number)
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PrStatus::Open { created_at, .. } => Some(created_at),
            PrStatus::Merged { .. } => None,
        }
    }

    pub fn merged_at(&self) -> Option<DateTime<Utc>> {
        match self.status {
            PrStatus::Merged { merged_at } => Some(merged_at),
            PrStatus::Open { .. } => None,
        }
    }

    pub fn reviewers(&self) -> &[String] {
        match &self.status {
            PrStatus::Open { reviewers, .. } => reviewers,
            PrStatus::Merged { .. } => &[],
        }
    }

    pub fn requested_reviewers(&self) -> &[String] {
        match &self.status {
            PrStatus::Open {
                requested_reviewers,
                ..
            } => requested_reviewers,
            PrStatus::Merged { .. } => &[],
        }
    }
}

/// Merged-PR lookback window in whole weeks, always within `MIN..=MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeeksBack(u8);

impl WeeksBack {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    pub fn new(weeks: u8) -> Option<Self> {
        (Self::MIN..=Self::MAX).contains(&weeks).then_some(Self(weeks))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Merges at or before this instant fall outside the window.
    pub fn cutoff_from(self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::weeks(i64::from(self.0))
    }
}

impl std::fmt::Display for WeeksBack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
