use super::TrackRecord;
use serde::Serialize;

/// Which on-disk database layout a decode pass came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DatabaseFormat {
    /// `iTunesCDB`: outer header plus an embedded deflate stream
    Compressed,

    /// `iTunesDB`: plain tagged-record file, play counts kept separately
    Uncompressed,
}

/// One decoded device database: the track list plus its source format
#[derive(Debug, Clone)]
pub struct MediaDatabase {
    /// Source layout; decides whether the Play Counts file applies
    pub format: DatabaseFormat,

    /// Decoded tracks in discovery order
    pub tracks: Vec<TrackRecord>,
}

impl MediaDatabase {
    pub fn new(format: DatabaseFormat) -> Self {
        Self {
            format,
            tracks: Vec::new(),
        }
    }

    /// Number of decoded tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Look up a track by its sequence id
    pub fn track_by_sequence_id(&self, id: u32) -> Option<&TrackRecord> {
        self.tracks.iter().find(|t| t.sequence_id == id)
    }
}
