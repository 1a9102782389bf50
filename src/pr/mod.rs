pub mod filter;
pub mod types;

pub use types::{PullRequestSummary, WeeksBack};

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::github::{GitHubError, PullRequestSource, Repository};

#[derive(Debug, Error)]
pub enum PrError {
    /// Repository listing failed; nothing can be reported.
    #[error("Could not list repositories: {0}")]
    UpstreamUnavailable(#[source] GitHubError),

    /// One repository could not be read; the run skips it.
    #[error("Could not fetch pull requests for {repository}: {source}")]
    RepositoryFetch {
        repository: String,
        #[source]
        source: GitHubError,
    },
}

/// Open pull requests by `username` across every visible repository,
/// in repository enumeration order.
///
/// Repositories that fail are logged and skipped; only a failed repository
/// listing aborts.
#[instrument(skip(source))]
pub async fn collect_open_prs(
    source: &dyn PullRequestSource,
    username: &str,
) -> Result<Vec<PullRequestSummary>, PrError> {
    let repos = source
        .list_repositories()
        .await
        .map_err(PrError::UpstreamUnavailable)?;
    info!(repositories = repos.len(), "collecting open pull requests");

    let mut collected = Vec::new();
    for repo in &repos {
        match open_for_repository(source, repo, username).await {
            Ok(prs) => collected.extend(prs),
            Err(err) => warn!(repository = %repo.full_name, error = %err, "skipping repository"),
        }
    }

    debug!(count = collected.len(), "collected open pull requests");
    Ok(collected)
}

/// Pull requests by `username` merged within the last `weeks`, newest merge first.
pub async fn collect_merged_prs(
    source: &dyn PullRequestSource,
    username: &str,
    weeks: WeeksBack,
) -> Result<Vec<PullRequestSummary>, PrError> {
    collect_merged_prs_since(source, username, weeks.cutoff_from(Utc::now())).await
}

/// Like [`collect_merged_prs`] with an explicit cutoff instant.
#[instrument(skip(source))]
pub async fn collect_merged_prs_since(
    source: &dyn PullRequestSource,
    username: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<PullRequestSummary>, PrError> {
    let repos = source
        .list_repositories()
        .await
        .map_err(PrError::UpstreamUnavailable)?;
    info!(repositories = repos.len(), %cutoff, "collecting merged pull requests");

    let mut collected = Vec::new();
    for repo in &repos {
        match merged_for_repository(source, repo, username, cutoff).await {
            Ok(prs) => collected.extend(prs),
            Err(err) => warn!(repository = %repo.full_name, error = %err, "skipping repository"),
        }
    }

    // Stable, so equal merge times keep enumeration order.
    collected.sort_by(|a, b| b.merged_at().cmp(&a.merged_at()));
    debug!(count = collected.len(), "collected merged pull requests");
    Ok(collected)
}

async fn open_for_repository(
    source: &dyn PullRequestSource,
    repo: &Repository,
    username: &str,
) -> Result<Vec<PullRequestSummary>, PrError> {
    let fetch_error = |source: GitHubError| PrError::RepositoryFetch {
        repository: repo.full_name.clone(),
        source,
    };

    let prs = source
        .fetch_open(&repo.owner.login, &repo.name)
        .await
        .map_err(fetch_error)?;

    let mut summaries = Vec::new();
    for pr in filter::select_open_by_author(prs, username) {
        let reviews = source
            .list_reviews(&repo.owner.login, &repo.name, pr.number)
            .await
            .map_err(fetch_error)?;
        summaries.push(PullRequestSummary::open(pr, &repo.full_name, &reviews));
    }
    Ok(summaries)
}

async fn merged_for_repository(
    source: &dyn PullRequestSource,
    repo: &Repository,
    username: &str,
    cutoff: DateTime<Utc>,
) -> Result<Vec<PullRequestSummary>, PrError> {
    let prs = source
        .fetch_merged_candidates(&repo.owner.login, &repo.name)
        .await
        .map_err(|source| PrError::RepositoryFetch {
            repository: repo.full_name.clone(),
            source,
        })?;

    Ok(filter::select_merged_by_author_and_window(prs, username, cutoff)
        .into_iter()
        .filter_map(|pr| PullRequestSummary::merged(pr, &repo.full_name))
        .collect())
}
