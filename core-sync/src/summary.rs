//! End-of-run report.

use bridge_traits::publishing::RemotePost;
use tracing::info;

/// Counters and read-back sample of a finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Listings returned by sources
    pub fetched: u64,
    /// Failed admission (no title, URL or id)
    pub skipped_missing_fields: u64,
    /// Already in the ledger
    pub skipped_duplicate: u64,
    /// Found on the remote and added to the ledger
    pub backfilled: u64,
    pub published: u64,
    pub failed: u64,
    /// Entries removed by retention
    pub pruned: usize,
    pub ledger_entries: usize,
    pub ledger_saved: bool,
    /// Most recent posts read back from the remote after the run
    pub recent: Vec<RemotePost>,
}

impl RunSummary {
    /// Number of candidates that reached a terminal state.
    pub fn processed(&self) -> u64 {
        self.skipped_missing_fields
            + self.skipped_duplicate
            + self.backfilled
            + self.published
            + self.failed
    }

    pub fn log(&self) {
        info!(
            fetched = self.fetched,
            skipped_missing_fields = self.skipped_missing_fields,
            skipped_duplicate = self.skipped_duplicate,
            backfilled = self.backfilled,
            published = self.published,
            failed = self.failed,
            pruned = self.pruned,
            ledger_entries = self.ledger_entries,
            ledger_saved = self.ledger_saved,
            "Run finished"
        );
        for post in &self.recent {
            info!(post_id = post.id, title = %post.title, url = %post.url, "Recent post");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_counts_terminal_outcomes() {
        let summary = RunSummary {
            fetched: 10,
            skipped_missing_fields: 1,
            skipped_duplicate: 4,
            backfilled: 1,
            published: 3,
            failed: 1,
            ..Default::default()
        };
        assert_eq!(summary.processed(), 10);
    }
}
