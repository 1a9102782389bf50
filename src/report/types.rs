use crate::pr::{PullRequestSummary, WeeksBack};
use crate::summary::SummaryOutcome;

/// Local snapshot of one run, rendered without posting anywhere.
#[derive(Debug)]
pub struct Report {
    /// Open PRs awaiting review, enumeration order
    pub open: Vec<PullRequestSummary>,
    /// Merged PRs, newest merge first
    pub merged: Vec<PullRequestSummary>,
    /// Lookback window the merged list was collected with
    pub weeks: WeeksBack,
    /// Executive summary, when one was requested
    pub summary: Option<SummaryOutcome>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.merged.is_empty()
    }

    pub fn with_summary(self, outcome: SummaryOutcome) -> Self {
        Report {
            summary: Some(outcome),
            ..self
        }
    }
}
