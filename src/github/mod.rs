pub mod types;

pub use types::{PullRequest, Repository, Review};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, instrument};

const USER_AGENT: &str = "weekly-updates";
const PAGE_SIZE: &str = "100";

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {url}: {message}")]
    Status {
        status: u16,
        url: String,
        message: String,
    },
}

/// Read access to the pull request data of the authenticated identity.
///
/// Every listing is a single page of at most 100 records.
#[async_trait]
pub trait PullRequestSource: Send + Sync {
    /// Repositories visible to the token, most recently updated first.
    async fn list_repositories(&self) -> Result<Vec<Repository>, GitHubError>;

    /// Open pull requests of one repository.
    async fn fetch_open(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>, GitHubError>;

    /// Closed pull requests of one repository, last updated first.
    async fn fetch_merged_candidates(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, GitHubError>;

    /// Reviews submitted on one pull request.
    async fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Review>, GitHubError>;
}

/// REST client bound to one token.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GitHubClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .client
            .get(&url)
            .query(query)
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .bearer_auth(&self.token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Status {
                status: status.as_u16(),
                url,
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl PullRequestSource for GitHubClient {
    #[instrument(skip(self))]
    async fn list_repositories(&self) -> Result<Vec<Repository>, GitHubError> {
        let repos: Vec<Repository> = self
            .get_json("/user/repos", &[("per_page", PAGE_SIZE), ("sort", "updated")])
            .await?;
        debug!(count = repos.len(), "listed repositories");
        Ok(repos)
    }

    #[instrument(skip(self))]
    async fn fetch_open(&self, owner: &str, repo: &str) -> Result<Vec<PullRequest>, GitHubError> {
        self.get_json(
            &format!("/repos/{owner}/{repo}/pulls"),
            &[("state", "open"), ("per_page", PAGE_SIZE)],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn fetch_merged_candidates(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, GitHubError> {
        self.get_json(
            &format!("/repos/{owner}/{repo}/pulls"),
            &[
                ("state", "closed"),
                ("sort", "updated"),
                ("direction", "desc"),
                ("per_page", PAGE_SIZE),
            ],
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_reviews(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<Review>, GitHubError> {
        self.get_json(&format!("/repos/{owner}/{repo}/pulls/{number}/reviews"), &[])
            .await
    }
}
