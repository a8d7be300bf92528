//! Scrobble submission boundary
//!
//! The core produces the play log; submitting it is a collaborator concern.
//! This module pins the seam: a sink trait taking event batches and
//! reporting per-batch outcomes, plus the batching helper. No network code
//! lives here; retries belong to the caller.

mod report;
mod sink;

pub use report::ReportBuilder;
pub use sink::{LogSink, ScrobbleSink, SubmitOutcome};
