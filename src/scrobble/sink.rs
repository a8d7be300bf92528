//! Sink trait definitions and the local logging sink

use crate::model::ScrobbleEvent;
use anyhow::Result;

/// Outcome of submitting one batch of events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitOutcome {
    /// Events the sink took responsibility for
    pub accepted: usize,

    /// Events the sink refused; callers may resubmit them independently
    pub rejected: usize,
}

impl SubmitOutcome {
    pub fn all_accepted(count: usize) -> Self {
        Self {
            accepted: count,
            rejected: 0,
        }
    }
}

/// Scrobble sink trait - allows swapping between a real submission client
/// and a local recording implementation
pub trait ScrobbleSink {
    /// Submit one batch of play events, oldest-first within the batch.
    /// An `Err` means the whole batch failed; a returned outcome may still
    /// report a partial rejection.
    fn submit(&mut self, batch: &[ScrobbleEvent]) -> Result<SubmitOutcome>;
}

/// Sink that logs batches locally instead of submitting them.
///
/// Used by the CLI's dry-run mode and by tests; accepts everything and
/// keeps a running total.
#[derive(Debug, Default)]
pub struct LogSink {
    submitted: usize,
}

impl LogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total events accepted across all batches so far
    pub fn submitted(&self) -> usize {
        self.submitted
    }
}

impl ScrobbleSink for LogSink {
    fn submit(&mut self, batch: &[ScrobbleEvent]) -> Result<SubmitOutcome> {
        for event in batch {
            log::info!(
                "scrobble: {} - {} @ {}",
                event.track.artist,
                event.track.title,
                event.played_at_unix
            );
        }
        self.submitted += batch.len();
        Ok(SubmitOutcome::all_accepted(batch.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TrackRecord;
    use std::sync::Arc;

    #[test]
    fn test_log_sink_accounts_for_every_event() {
        let track = Arc::new(TrackRecord::new(0));
        let batch: Vec<ScrobbleEvent> = (0..3)
            .map(|i| ScrobbleEvent {
                track: Arc::clone(&track),
                played_at_unix: 1000 + i,
            })
            .collect();

        let mut sink = LogSink::new();
        let outcome = sink.submit(&batch).unwrap();
        assert_eq!(outcome, SubmitOutcome::all_accepted(3));

        sink.submit(&batch[..1]).unwrap();
        assert_eq!(sink.submitted(), 4);
    }
}
