pub mod claude;

pub use claude::{ClaudeClient, CompletionClient};

use thiserror::Error;
use tracing::{info, warn};

use crate::message::{truncate, Block, ChatMessage};
use crate::pr::{PullRequestSummary, WeeksBack};

/// Longest description embedded in the prompt.
pub const PROMPT_DESCRIPTION_LIMIT: usize = 150;

#[derive(Debug, Error)]
pub enum SummarizationError {
    #[error("Completion request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("Completion endpoint returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Completion contained no text")]
    EmptyCompletion,
}

/// Where the executive summary body came from. Both variants render to the
/// same message layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SummaryOutcome {
    Ai(String),
    Fallback(String),
}

impl SummaryOutcome {
    pub fn text(&self) -> &str {
        match self {
            SummaryOutcome::Ai(text) | SummaryOutcome::Fallback(text) => text,
        }
    }

    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        matches!(self, SummaryOutcome::Fallback(_))
    }
}

/// Render the instruction prompt for the completion endpoint.
pub fn build_prompt(
    open: &[PullRequestSummary],
    merged: &[PullRequestSummary],
    weeks: WeeksBack,
) -> String {
    let mut prompt = String::from(
        "You are an AI assistant helping to create executive summaries of GitHub Pull Request status updates.\n\n\
         Please analyze the following GitHub data and create a concise, professional executive summary \
         that would be suitable for a business context.\n\n",
    );

    prompt.push_str("**Data to analyze:**\n");
    prompt.push_str(&format!("- Open PRs waiting for review: {}\n", open.len()));
    prompt.push_str(&format!(
        "- Merged PRs in the last {weeks} weeks: {}\n\n",
        merged.len()
    ));

    prompt.push_str("**Open PRs Details:**\n");
    for pr in open {
        prompt.push_str(&format!(
            "- {} ({} #{}) {}\n",
            pr.title,
            pr.repository,
            pr.number,
            pr.url
        ));
        if !pr.reviewers().is_empty() {
            prompt.push_str(&format!("  Reviewers: {}\n", pr.reviewers().join(", ")));
        }
        if !pr.requested_reviewers().is_empty() {
            prompt.push_str(&format!(
                "  Requested: {}\n",
                pr.requested_reviewers().join(", ")
            ));
        }
        prompt.push_str(&format!(
            "  Description: {}\n",
            truncate(&pr.description, PROMPT_DESCRIPTION_LIMIT)
        ));
    }

    prompt.push_str("\n**Merged PRs Details:**\n");
    for pr in merged {
        let merged_at = pr
            .merged_at()
            .map(|at| at.to_rfc3339())
            .unwrap_or_default();
        prompt.push_str(&format!(
            "- {} ({} #{}) {} - Merged: {}\n",
            pr.title, pr.repository, pr.number, pr.url, merged_at
        ));
        prompt.push_str(&format!(
            "  Description: {}\n",
            truncate(&pr.description, PROMPT_DESCRIPTION_LIMIT)
        ));
    }

    prompt.push_str(
        "\n**Instructions:**\n\
         1. Create a casual executive summary (1 paragraph)\n\
         2. List the data you got in bullet points\n\
         3. Use bullet points for easy scannability\n\
         4. Leave links to the PRs for easy access (don't pollute)\n\n\
         **Format the response as a clean executive summary suitable for Slack.**",
    );
    prompt
}

/// Ask the completion endpoint for a summary of `prompt`. The text is not
/// inspected.
pub async fn summarize(
    client: &dyn CompletionClient,
    prompt: &str,
) -> Result<String, SummarizationError> {
    client.complete(prompt).await
}

/// Produce a summary body, falling back to [`fallback_summary_text`] when no
/// client is configured or the completion fails.
pub async fn generate_summary(
    client: Option<&dyn CompletionClient>,
    open: &[PullRequestSummary],
    merged: &[PullRequestSummary],
    weeks: WeeksBack,
) -> SummaryOutcome {
    let Some(client) = client else {
        info!("no completion API key configured, using fallback summary");
        return SummaryOutcome::Fallback(fallback_summary_text(open));
    };

    let prompt = build_prompt(open, merged, weeks);
    match summarize(client, &prompt).await {
        Ok(text) => SummaryOutcome::Ai(text),
        Err(err) => {
            warn!(error = %err, "summarization failed, using fallback summary");
            SummaryOutcome::Fallback(fallback_summary_text(open))
        }
    }
}

/// Deterministic summary body: one bullet per open PR with its review state.
pub fn fallback_summary_text(open: &[PullRequestSummary]) -> String {
    if open.is_empty() {
        return "🎉 Great news! You have no open PRs waiting for reviews.".to_string();
    }

    let mut text = String::from("Here are your open PRs and the reviews they are waiting on:\n\n");
    for pr in open {
        text.push_str(&format!(
            "• <{}|{}> ({} #{})\n",
            pr.url, pr.title, pr.repository, pr.number
        ));
        if !pr.reviewers().is_empty() {
            text.push_str(&format!("  Reviewers: {}\n", pr.reviewers().join(", ")));
        }
        if !pr.requested_reviewers().is_empty() {
            text.push_str(&format!(
                "  Requested: {}\n",
                pr.requested_reviewers().join(", ")
            ));
        }
        text.push('\n');
    }
    text
}

/// Wrap a summary body in the executive summary layout: header, status
/// overview, divider, body.
pub fn executive_summary_message(
    outcome: &SummaryOutcome,
    open: &[PullRequestSummary],
    merged: &[PullRequestSummary],
    weeks: WeeksBack,
) -> ChatMessage {
    ChatMessage {
        text: format!(
            "Executive Summary: {} open PRs, {} merged PRs in last {weeks} weeks",
            open.len(),
            merged.len()
        ),
        blocks: vec![
            Block::header("📊 Executive Summary"),
            Block::section(format!(
                "*Status Overview - Last {weeks} Week(s)*\n• Open PRs: {}\n• Merged PRs: {}",
                open.len(),
                merged.len()
            )),
            Block::Divider,
            Block::section(outcome.text()),
        ],
    }
}
