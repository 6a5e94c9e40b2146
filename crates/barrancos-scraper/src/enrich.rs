//! Bookkeeping shared by the sequential enrichment loops.

use std::time::Duration;

/// Outcome of one enrichment run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnrichSummary {
    /// Records a lookup was attempted (or skipped as already linked) for.
    pub processed: usize,
    /// Records that received new data.
    pub updated: usize,
}

/// Sleeps between consecutive requests; a no-op for a zero delay or after
/// the last record.
pub(crate) async fn pause(delay: Duration, more_remaining: bool) {
    if more_remaining && !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
