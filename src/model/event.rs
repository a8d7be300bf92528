use super::TrackRecord;
use serde::Serialize;
use std::sync::Arc;

/// A single reconstructed play of one track.
///
/// Produced by the history expander from aggregate play counts; ephemeral,
/// consumed by the scrobble submission layer and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ScrobbleEvent {
    /// The track that was played
    pub track: Arc<TrackRecord>,

    /// When the play happened, unix epoch seconds
    pub played_at_unix: i64,
}
