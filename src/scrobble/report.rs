//! Batching of play events into submission-sized reports

use crate::model::ScrobbleEvent;

/// Classic submission page size
const DEFAULT_BATCH_SIZE: usize = 50;

/// Chunks an event list into fixed-size batches, preserving order.
///
/// Each batch can be submitted and fail independently; the builder itself
/// holds no submission state.
pub struct ReportBuilder {
    batch_size: usize,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Override the per-batch event count (must be nonzero)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Split `events` into submission batches
    pub fn batches<'a>(&self, events: &'a [ScrobbleEvent]) -> Vec<&'a [ScrobbleEvent]> {
        events.chunks(self.batch_size).collect()
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new()
    }
}
