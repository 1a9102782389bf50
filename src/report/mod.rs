pub mod types;

pub use types::Report;

use crate::message::format_date;
use crate::pr::{PullRequestSummary, WeeksBack};
use crate::summary::SummaryOutcome;
use colored::Colorize;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report file: {0}")]
    FileWrite(#[from] std::io::Error),
}

pub fn build(open: Vec<PullRequestSummary>, merged: Vec<PullRequestSummary>, weeks: WeeksBack) -> Report {
    Report {
        open,
        merged,
        weeks,
        summary: None,
    }
}

/// Output the report to terminal (default) or to a markdown file.
#[instrument(skip(report), fields(open = report.open.len(), merged = report.merged.len()))]
pub fn output(report: &Report, output_path: Option<&Path>) -> Result<(), ReportError> {
    match output_path {
        None => {
            debug!("writing report to terminal");
            print!("{}", render_terminal(report));
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "writing report to file");
            write_markdown_report(report, path)
        }
    }
}

fn summary_source(outcome: &SummaryOutcome) -> &'static str {
    match outcome {
        SummaryOutcome::Ai(_) => "AI",
        SummaryOutcome::Fallback(_) => "fallback",
    }
}

/// Terminal view of the report:
///
/// ═══ Executive Summary (AI) ═══        (only with --summary)
/// ...
///
/// ═══ Open PRs (2) ═══
/// 1. Add retries
///    https://github.com/org/a/pull/12
///    Opened: May 01, 2024
///    Reviewers: bob
///
/// ═══ Merged PRs - Last 2 Week(s) (1) ═══
/// 1. Fix login
///    https://github.com/org/b/pull/7
///    Merged: Mar 14, 2024
fn render_terminal(report: &Report) -> String {
    let mut out = String::from("\n");

    if let Some(outcome) = &report.summary {
        let heading = format!("═══ Executive Summary ({}) ═══", summary_source(outcome));
        let heading = match outcome {
            SummaryOutcome::Ai(_) => heading.cyan().bold(),
            SummaryOutcome::Fallback(_) => heading.yellow().bold(),
        };
        out.push_str(&format!("{heading}\n{}\n\n", outcome.text().trim_end()));
    }

    out.push_str(&format!(
        "{}\n",
        format!("═══ Open PRs ({}) ═══", report.open.len()).cyan().bold()
    ));
    if report.open.is_empty() {
        out.push_str(&format!("  {}\n", "No open PRs waiting for reviews.".green()));
    }
    for (index, pr) in report.open.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, pr.title.bold()));
        out.push_str(&format!("   {}\n", pr.pull_link()));
        if let Some(created_at) = pr.created_at() {
            out.push_str(&format!("   Opened: {}\n", format_date(created_at)));
        }
        if !pr.reviewers().is_empty() {
            out.push_str(&format!("   Reviewers: {}\n", pr.reviewers().join(", ")));
        }
        if !pr.requested_reviewers().is_empty() {
            out.push_str(&format!(
                "   Requested: {}\n",
                pr.requested_reviewers().join(", ").yellow()
            ));
        }
    }
    out.push('\n');

    out.push_str(&format!(
        "{}\n",
        format!(
            "═══ Merged PRs - Last {} Week(s) ({}) ═══",
            report.weeks,
            report.merged.len()
        )
        .cyan()
        .bold()
    ));
    if report.merged.is_empty() {
        out.push_str("  No PRs merged in this window.\n");
    }
    for (index, pr) in report.merged.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", index + 1, pr.title.bold()));
        out.push_str(&format!("   {}\n", pr.pull_link()));
        if let Some(merged_at) = pr.merged_at() {
            out.push_str(&format!("   Merged: {}\n", format_date(merged_at).green()));
        }
    }
    out.push('\n');
    out
}

/// Same content as the terminal view, as markdown.
fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    if let Some(outcome) = &report.summary {
        md.push_str(&format!(
            "# Executive Summary ({})\n\n{}\n\n",
            summary_source(outcome),
            outcome.text().trim_end()
        ));
    }

    md.push_str(&format!("# Open PRs ({})\n\n", report.open.len()));
    if report.open.is_empty() {
        md.push_str("No open PRs waiting for reviews.\n\n");
    }
    for pr in &report.open {
        md.push_str(&format!("- [{}]({}) ({} #{})\n", pr.title, pr.url, pr.repository, pr.number));
        if let Some(created_at) = pr.created_at() {
            md.push_str(&format!("  - **Opened:** {}\n", format_date(created_at)));
        }
        if !pr.reviewers().is_empty() {
            md.push_str(&format!("  - **Reviewers:** {}\n", pr.reviewers().join(", ")));
        }
        if !pr.requested_reviewers().is_empty() {
            md.push_str(&format!(
                "  - **Requested:** {}\n",
                pr.requested_reviewers().join(", ")
            ));
        }
    }
    if !report.open.is_empty() {
        md.push('\n');
    }

    md.push_str(&format!(
        "# Merged PRs - Last {} Week(s) ({})\n\n",
        report.weeks,
        report.merged.len()
    ));
    if report.merged.is_empty() {
        md.push_str("No PRs merged in this window.\n");
    }
    for pr in &report.merged {
        let merged = pr
            .merged_at()
            .map(|at| format!(" - merged {}", format_date(at)))
            .unwrap_or_default();
        md.push_str(&format!(
            "- [{}]({}) ({} #{}){}\n",
            pr.title, pr.url, pr.repository, pr.number, merged
        ));
    }
    md
}

fn write_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    std::fs::write(path, render_markdown(report))?;
    Ok(())
}
