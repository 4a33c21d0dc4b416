//! Retention policy.

use std::time::Duration;
use tracing::info;

use crate::ledger::Ledger;

/// Drop entries older than `max_age` relative to `now` (Unix seconds).
///
/// A zero `max_age` disables retention and returns the ledger unchanged.
/// Otherwise entries with an unknown age (`first_seen == 0`) are dropped
/// too, since they cannot be shown to be young. Order is preserved.
pub fn prune(ledger: &Ledger, max_age: Duration, now: i64) -> Ledger {
    if max_age.is_zero() {
        return ledger.clone();
    }

    let max_age_secs = i64::try_from(max_age.as_secs()).unwrap_or(i64::MAX);
    let cutoff = now.saturating_sub(max_age_secs);

    let kept: Ledger = ledger
        .iter()
        .filter(|entry| entry.first_seen != 0 && entry.first_seen >= cutoff)
        .cloned()
        .collect();

    let removed = ledger.len() - kept.len();
    if removed > 0 {
        info!(removed, kept = kept.len(), cutoff, "Pruned old ledger entries");
    }
    kept
}
