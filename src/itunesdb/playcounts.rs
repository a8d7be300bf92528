//! Play Counts file parsing and correlation
//!
//! The device keeps per-track aggregate play data in a separate fixed-stride
//! file next to the uncompressed database (the compressed layout embeds the
//! same data in its own items). Entries carry no track identifier of their
//! own: an entry's file position is matched against a decoded track's
//! sequence id. That is an exact-match lookup, not positional replacement —
//! the two files are not guaranteed to enumerate tracks in the same order.

use super::error::DecodeError;
use super::primitives::{hfs_to_unix, read_u32_at};
use crate::model::TrackRecord;
use std::collections::HashMap;
use std::path::Path;

/// Auxiliary file name next to `iTunesDB`
pub const PLAY_COUNTS_FILE: &str = "Play Counts";

const STRIDE_OFFSET: usize = 8;
const ENTRY_COUNT_OFFSET: usize = 12;
const ENTRY_TABLE_OFFSET: usize = 96;

/// One nonzero record from the Play Counts file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayCountEntry {
    /// Position of the entry in the file, the correlation key
    pub index: u32,

    /// Aggregate play count, always nonzero
    pub play_count: u32,

    /// Most recent play, unix epoch seconds
    pub last_played_unix: i64,
}

/// Parse the fixed-stride entry table, keeping only nonzero entries.
///
/// Layout: 8 reserved bytes, per-entry stride, entry count, 80 reserved
/// bytes, then `count - 1` entries. Each entry starts with its play count
/// and, only when that is nonzero, an HFS-encoded last-played timestamp;
/// the rest of the stride is padding and is skipped absolutely regardless
/// of which leading fields were present.
pub fn parse_play_counts(
    data: &[u8],
    utc_offset_secs: i32,
) -> Result<Vec<PlayCountEntry>, DecodeError> {
    let stride = read_u32_at(data, STRIDE_OFFSET)? as usize;
    let declared_count = read_u32_at(data, ENTRY_COUNT_OFFSET)? as usize;

    let mut entries = Vec::new();
    if stride == 0 {
        log::warn!("play counts file declares a zero stride, nothing to read");
        return Ok(entries);
    }

    let mut offset = ENTRY_TABLE_OFFSET;
    for index in 0..declared_count.saturating_sub(1) {
        let Ok(play_count) = read_u32_at(data, offset) else {
            break;
        };
        if play_count > 0 {
            let last_played_unix = read_u32_at(data, offset + 4)
                .map(|hfs| hfs_to_unix(hfs, utc_offset_secs))
                .unwrap_or(0);
            entries.push(PlayCountEntry {
                index: index as u32,
                play_count,
                last_played_unix,
            });
        }
        offset += stride;
    }

    log::debug!(
        "play counts: {} nonzero of {} declared entries",
        entries.len(),
        declared_count
    );
    Ok(entries)
}

/// Merge parsed entries into the decoded track list by sequence id.
/// Entries with no matching track are dropped silently.
pub fn correlate(tracks: &mut [TrackRecord], entries: &[PlayCountEntry]) {
    let by_id: HashMap<u32, usize> = tracks
        .iter()
        .enumerate()
        .map(|(pos, track)| (track.sequence_id, pos))
        .collect();

    let mut matched = 0usize;
    for entry in entries {
        match by_id.get(&entry.index) {
            Some(&pos) => {
                tracks[pos].play_count = entry.play_count;
                tracks[pos].last_played_unix = entry.last_played_unix;
                matched += 1;
            }
            None => {
                log::debug!("play-count entry {} matches no track, dropped", entry.index);
            }
        }
    }
    log::info!("correlated {matched} of {} play-count entries", entries.len());
}

/// Read and apply the Play Counts file next to an uncompressed database.
/// A missing or unreadable file leaves the track list as decoded; the
/// database's own per-item counts are the fallback.
pub fn apply_play_counts(dir: &Path, tracks: &mut [TrackRecord], utc_offset_secs: i32) {
    let path = dir.join(PLAY_COUNTS_FILE);
    let data = match std::fs::read(&path) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("no usable play counts file at {path:?}: {err}");
            return;
        }
    };
    match parse_play_counts(&data, utc_offset_secs) {
        Ok(entries) => correlate(tracks, &entries),
        Err(err) => log::warn!("play counts file at {path:?} is malformed: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itunesdb::primitives::HFS_EPOCH_DELTA;

    fn build_file(stride: u32, plays: &[(u32, u32)]) -> Vec<u8> {
        // plays: (play_count, last_played_hfs) per entry; the file declares
        // one more entry than it stores, matching the format quirk.
        let mut out = vec![0u8; ENTRY_TABLE_OFFSET];
        out[STRIDE_OFFSET..STRIDE_OFFSET + 4].copy_from_slice(&stride.to_le_bytes());
        let declared = plays.len() as u32 + 1;
        out[ENTRY_COUNT_OFFSET..ENTRY_COUNT_OFFSET + 4].copy_from_slice(&declared.to_le_bytes());
        for &(count, hfs) in plays {
            let base = out.len();
            out.resize(base + stride as usize, 0);
            out[base..base + 4].copy_from_slice(&count.to_le_bytes());
            if count > 0 {
                out[base + 4..base + 8].copy_from_slice(&hfs.to_le_bytes());
            }
        }
        out
    }

    fn hfs(unix: i64) -> u32 {
        (unix + HFS_EPOCH_DELTA) as u32
    }

    #[test]
    fn test_parse_keeps_only_nonzero_entries() {
        let data = build_file(16, &[(3, hfs(1000)), (0, 0), (5, hfs(2000))]);
        let entries = parse_play_counts(&data, 0).unwrap();
        assert_eq!(
            entries,
            vec![
                PlayCountEntry {
                    index: 0,
                    play_count: 3,
                    last_played_unix: 1000
                },
                PlayCountEntry {
                    index: 2,
                    play_count: 5,
                    last_played_unix: 2000
                },
            ]
        );
    }

    #[test]
    fn test_parse_respects_wide_stride() {
        // Padding after the two leading fields must be skipped absolutely.
        let data = build_file(28, &[(1, hfs(500)), (2, hfs(600))]);
        let entries = parse_play_counts(&data, 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].index, 1);
        assert_eq!(entries[1].last_played_unix, 600);
    }

    #[test]
    fn test_correlate_updates_only_matching_ids() {
        let mut tracks: Vec<TrackRecord> = (0..3).map(TrackRecord::new).collect();
        let entries = vec![
            PlayCountEntry {
                index: 0,
                play_count: 2,
                last_played_unix: 111,
            },
            PlayCountEntry {
                index: 2,
                play_count: 9,
                last_played_unix: 333,
            },
            // No track carries sequence id 7: dropped without error.
            PlayCountEntry {
                index: 7,
                play_count: 1,
                last_played_unix: 777,
            },
        ];
        correlate(&mut tracks, &entries);

        assert_eq!(tracks[0].play_count, 2);
        assert_eq!(tracks[0].last_played_unix, 111);
        assert_eq!(tracks[1].play_count, 0);
        assert_eq!(tracks[1].last_played_unix, 0);
        assert_eq!(tracks[2].play_count, 9);
        assert_eq!(tracks[2].last_played_unix, 333);
    }

    #[test]
    fn test_correlate_is_keyed_not_positional() {
        // Tracks out of id order: the entry at file position 1 must land on
        // the track whose sequence id is 1, wherever it sits in the list.
        let mut tracks = vec![TrackRecord::new(5), TrackRecord::new(1)];
        let entries = vec![PlayCountEntry {
            index: 1,
            play_count: 4,
            last_played_unix: 42,
        }];
        correlate(&mut tracks, &entries);
        assert_eq!(tracks[0].play_count, 0);
        assert_eq!(tracks[1].play_count, 4);
    }

    #[test]
    fn test_truncated_entry_table_stops_cleanly() {
        let mut data = build_file(16, &[(1, hfs(100)), (2, hfs(200))]);
        // Second entry keeps its count but loses the timestamp.
        data.truncate(ENTRY_TABLE_OFFSET + 22);
        let entries = parse_play_counts(&data, 0).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].play_count, 2);
        assert_eq!(entries[1].last_played_unix, 0);
    }
}
