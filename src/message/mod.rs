pub mod types;

pub use types::{Block, ChatMessage};

use chrono::{DateTime, Utc};

use crate::pr::{PullRequestSummary, WeeksBack};

/// Longest description shown in an item block before it is cut.
pub const DESCRIPTION_LIMIT: usize = 200;

pub const NO_OPEN_PRS: &str = "🎉 *Great news!* You have no open PRs waiting for reviews.";

/// First `limit` characters of `text`, followed by `...` if anything was cut.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

/// Calendar date of `at` in UTC, e.g. `Mar 14, 2024`.
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%b %d, %Y").to_string()
}

/// Format open pull requests awaiting review.
pub fn open_prs_message(prs: &[PullRequestSummary]) -> ChatMessage {
    if prs.is_empty() {
        return ChatMessage {
            text: NO_OPEN_PRS.to_string(),
            blocks: vec![Block::section(NO_OPEN_PRS)],
        };
    }

    let mut blocks = vec![
        Block::header(format!("🔍 Open PRs Waiting for Reviews ({})", prs.len())),
        Block::Divider,
    ];
    push_items(&mut blocks, prs, open_item);

    ChatMessage {
        text: format!("You have {} open PR(s) waiting for reviews", prs.len()),
        blocks,
    }
}

/// Format pull requests merged within the last `weeks`.
pub fn merged_prs_message(prs: &[PullRequestSummary], weeks: WeeksBack) -> ChatMessage {
    if prs.is_empty() {
        let sentence = format!("No PRs were merged in the last {weeks} week(s).");
        return ChatMessage {
            blocks: vec![Block::section(format!("📊 *Weekly Summary*\n{sentence}"))],
            text: sentence,
        };
    }

    let mut blocks = vec![
        Block::header(format!("📊 Weekly Summary - Last {weeks} Week(s)")),
        Block::section(format!("*{} PR(s) merged*", prs.len())),
        Block::Divider,
    ];
    push_items(&mut blocks, prs, merged_item);

    ChatMessage {
        text: format!("{} PR(s) were merged in the last {weeks} week(s)", prs.len()),
        blocks,
    }
}

/// One section per item, dividers between items but not after the last.
fn push_items(
    blocks: &mut Vec<Block>,
    prs: &[PullRequestSummary],
    render: fn(&PullRequestSummary) -> String,
) {
    for (index, pr) in prs.iter().enumerate() {
        if index > 0 {
            blocks.push(Block::Divider);
        }
        blocks.push(Block::section(render(pr)));
    }
}

fn title_and_repo(pr: &PullRequestSummary) -> String {
    format!(
        "*<{}|{}>*\n*Repo:* <{}|{}> (#{})",
        pr.url,
        pr.title,
        pr.pull_link(),
        pr.repository,
        pr.number
    )
}

fn open_item(pr: &PullRequestSummary) -> String {
    let mut text = title_and_repo(pr);
    text.push('\n');
    if !pr.reviewers().is_empty() {
        text.push_str(&format!("*Reviewers:* {}\n", pr.reviewers().join(", ")));
    }
    if !pr.requested_reviewers().is_empty() {
        text.push_str(&format!(
            "*Requested Reviewers:* {}\n",
            pr.requested_reviewers().join(", ")
        ));
    }
    text.push('\n');
    text.push_str(&truncate(&pr.description, DESCRIPTION_LIMIT));
    text
}

fn merged_item(pr: &PullRequestSummary) -> String {
    let merged = pr
        .merged_at()
        .map(|at| format!(" • *Merged:* {}", format_date(at)))
        .unwrap_or_default();
    format!(
        "{}{}\n\n{}",
        title_and_repo(pr),
        merged,
        truncate(&pr.description, DESCRIPTION_LIMIT)
    )
}
