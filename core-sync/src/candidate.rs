//! # Candidate State Machine
//!
//! Every listing fetched for a query axis moves through validated states:
//!
//! ```text
//! Fetched → Admitted → DedupChecked → ReconcileChecked → Published → LedgerUpdated
//!    ↓          ↓                ↓                 ↓
//! Rejected   Skipped   SkippedUpdateLedger   LoggedNotLedgered
//! ```
//!
//! `Skipped` is a ledger hit, `SkippedUpdateLedger` a remote hit that gets
//! backfilled into the ledger, `LoggedNotLedgered` a failed publish that
//! stays eligible for the next run.

use core_ledger::ListingKey;
use std::fmt;

use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateState {
    Fetched,
    Admitted,
    Rejected,
    DedupChecked,
    Skipped,
    ReconcileChecked,
    SkippedUpdateLedger,
    Published,
    LoggedNotLedgered,
    LedgerUpdated,
}

impl CandidateState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidateState::Fetched => "fetched",
            CandidateState::Admitted => "admitted",
            CandidateState::Rejected => "rejected",
            CandidateState::DedupChecked => "dedup_checked",
            CandidateState::Skipped => "skipped",
            CandidateState::ReconcileChecked => "reconcile_checked",
            CandidateState::SkippedUpdateLedger => "skipped_update_ledger",
            CandidateState::Published => "published",
            CandidateState::LoggedNotLedgered => "logged_not_ledgered",
            CandidateState::LedgerUpdated => "ledger_updated",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CandidateState::Rejected
                | CandidateState::Skipped
                | CandidateState::SkippedUpdateLedger
                | CandidateState::LoggedNotLedgered
                | CandidateState::LedgerUpdated
        )
    }

    fn allows(&self, next: CandidateState) -> bool {
        use CandidateState::*;
        matches!(
            (self, next),
            (Fetched, Admitted)
                | (Fetched, Rejected)
                | (Admitted, DedupChecked)
                | (Admitted, Skipped)
                | (DedupChecked, ReconcileChecked)
                | (DedupChecked, SkippedUpdateLedger)
                // Admission can still fail at publish time
                | (DedupChecked, Rejected)
                | (ReconcileChecked, Published)
                | (ReconcileChecked, LoggedNotLedgered)
                | (Published, LedgerUpdated)
        )
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched listing on its way through a run.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub source: String,
    pub key: Option<ListingKey>,
    state: CandidateState,
}

impl Candidate {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            key: None,
            state: CandidateState::Fetched,
        }
    }

    pub fn state(&self) -> CandidateState {
        self.state
    }

    /// Move to `next`.
    ///
    /// # Errors
    ///
    /// Returns an error if `next` is not reachable from the current state.
    pub fn advance(&mut self, next: CandidateState) -> Result<()> {
        if !self.state.allows(next) {
            return Err(SyncError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
                reason: if self.state.is_terminal() {
                    "candidate already finished".to_string()
                } else {
                    "transition not allowed".to_string()
                },
            });
        }
        self.state = next;
        Ok(())
    }
}
