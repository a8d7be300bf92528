//! Aggregate-to-discrete play expansion

use crate::model::{ScrobbleEvent, TrackRecord};
use std::sync::Arc;

/// Expand a track's aggregate play count into discrete events.
///
/// The device only records how often a track was played and when it last
/// was; true per-play timestamps are not recoverable. The approximation:
/// the most recent event keeps the recorded timestamp verbatim, and each
/// earlier one is pushed back by exactly one track length, as if the plays
/// ran back to back. A zero track length falls back to the three-minute
/// default so the spacing never degenerates.
pub fn expand_track(track: &Arc<TrackRecord>) -> Vec<ScrobbleEvent> {
    let spacing = track.length_secs();
    (0..track.play_count)
        .map(|i| ScrobbleEvent {
            track: Arc::clone(track),
            played_at_unix: track.last_played_unix - i64::from(i) * spacing,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(play_count: u32, length_ms: u32, last_played_unix: i64) -> Arc<TrackRecord> {
        Arc::new(TrackRecord {
            play_count,
            length_ms,
            last_played_unix,
            ..TrackRecord::new(0)
        })
    }

    #[test]
    fn test_events_step_back_by_track_length() {
        let events = expand_track(&track(3, 180_000, 1000));
        let stamps: Vec<i64> = events.iter().map(|e| e.played_at_unix).collect();
        assert_eq!(stamps, vec![1000, 820, 640]);
    }

    #[test]
    fn test_zero_play_count_yields_nothing() {
        assert!(expand_track(&track(0, 180_000, 1000)).is_empty());
    }

    #[test]
    fn test_zero_length_uses_default_spacing() {
        let events = expand_track(&track(2, 0, 500));
        assert_eq!(events[0].played_at_unix, 500);
        assert_eq!(events[1].played_at_unix, 320);
    }
}
