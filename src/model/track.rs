use serde::{Deserialize, Serialize};

/// Fallback track length when the database carries none, in milliseconds.
pub(crate) const DEFAULT_LENGTH_MS: u32 = 180_000;

/// Represents a single media item decoded from the device database
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRecord {
    /// Join key against play-count data. Assigned in discovery order for the
    /// uncompressed database; taken from the item's embedded identifier for
    /// the compressed one. Unique within a single decode pass, and the only
    /// valid way to match a track — the two formats do not enumerate tracks
    /// in the same order, so positional matching across them is invalid.
    pub sequence_id: u32,

    /// Track title (empty when the database carries none)
    pub title: String,

    /// Artist name (empty when the database carries none)
    pub artist: String,

    /// Album name (empty when the database carries none)
    pub album: String,

    /// Track duration in milliseconds
    pub length_ms: u32,

    /// Aggregate number of plays recorded on the device
    pub play_count: u32,

    /// Most recent play as unix epoch seconds, 0 = never played
    pub last_played_unix: i64,
}

impl TrackRecord {
    /// Create an empty record with the given sequence id
    pub fn new(sequence_id: u32) -> Self {
        Self {
            sequence_id,
            title: String::new(),
            artist: String::new(),
            album: String::new(),
            length_ms: DEFAULT_LENGTH_MS,
            play_count: 0,
            last_played_unix: 0,
        }
    }

    /// Track length in whole seconds, substituting the default for a zero
    /// length so play-event spacing never degenerates to zero.
    pub fn length_secs(&self) -> i64 {
        let ms = if self.length_ms == 0 {
            DEFAULT_LENGTH_MS
        } else {
            self.length_ms
        };
        i64::from(ms / 1000)
    }
}
