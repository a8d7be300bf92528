//! Tagged-record decoder for the device database
//!
//! Both database layouts share one record schema: a nested hierarchy of
//! length-prefixed blocks (`mhbd` database header, `mhsd` dataset, `mhlt`
//! track list, `mhit` track item, `mhod` metadata object). The per-record
//! decoders below exist once and are driven by two traversal strategies:
//!
//! - a brute-force marker scan over the file for the uncompressed layout,
//!   which in practice is not reliably reachable via clean header chaining
//! - a structured walk by declared sizes over the inflated in-memory buffer
//!   for the compressed layout
//!
//! Per the fault-tolerance policy, malformed sub-records are skipped by
//! their declared size and the traversal continues, so a corrupt item costs
//! that item only, never the rest of the extraction.

use super::error::DecodeError;
use super::primitives::{decode_string, expect_tag, hfs_to_unix, read_u32_at};
use super::source::ByteSource;
use crate::model::TrackRecord;

// Fixed field offsets within an mhit, from the item's start
const MHIT_CHILD_COUNT: usize = 0x0c;
const MHIT_ITEM_ID: usize = 0x10;
const MHIT_LENGTH_MS: usize = 0x28;
const MHIT_PLAY_COUNT: usize = 0x50;
const MHIT_LAST_PLAYED: usize = 0x58;

/// mhod object types carrying strings we care about
const MHOD_TITLE: u32 = 1;
const MHOD_ALBUM: u32 = 3;
const MHOD_ARTIST: u32 = 4;

/// Smallest block that still holds tag + header size + total size + type
const MIN_BLOCK_LEN: usize = 16;

/// Track-list dataset type within an mhsd
const DATASET_TRACK_LIST: u32 = 1;

/// Read window for the marker scan over a file-backed source
const SCAN_WINDOW: usize = 1 << 20;

/// Cap on a single item fetch during the scan; a false marker hit in noise
/// can carry an absurd declared size
const MAX_ITEM_LEN: u32 = 1 << 20;

/// One decoded mhit before a sequence id has been assigned
struct RawItem {
    total_len: u32,
    embedded_id: u32,
    title: String,
    artist: String,
    album: String,
    length_ms: u32,
    play_count: u32,
    last_played_unix: i64,
}

impl RawItem {
    fn into_track(self, sequence_id: u32) -> TrackRecord {
        TrackRecord {
            sequence_id,
            title: self.title,
            artist: self.artist,
            album: self.album,
            length_ms: self.length_ms,
            play_count: self.play_count,
            last_played_unix: self.last_played_unix,
        }
    }
}

/// Decode one mhit anchored at the start of `buf`, including its mhod
/// children. `buf` should span the item's declared total size; a shorter
/// slice yields whatever fields fit (truncated-file tolerance).
fn decode_item(buf: &[u8], utc_offset_secs: i32) -> Result<RawItem, DecodeError> {
    expect_tag(buf, 0, "mhit")?;
    let header_len = read_u32_at(buf, 4)? as usize;
    let total_len = read_u32_at(buf, 8)?;
    let child_count = read_u32_at(buf, MHIT_CHILD_COUNT)?;
    let embedded_id = read_u32_at(buf, MHIT_ITEM_ID)?;

    // Fixed fields live inside the item header; a short item simply keeps
    // the defaults.
    let length_ms = read_u32_at(buf, MHIT_LENGTH_MS).unwrap_or(0);
    let play_count = read_u32_at(buf, MHIT_PLAY_COUNT).unwrap_or(0);
    let last_played_unix = read_u32_at(buf, MHIT_LAST_PLAYED)
        .map(|hfs| hfs_to_unix(hfs, utc_offset_secs))
        .unwrap_or(0);

    let mut item = RawItem {
        total_len,
        embedded_id,
        title: String::new(),
        artist: String::new(),
        album: String::new(),
        length_ms,
        play_count,
        last_played_unix,
    };

    let mut cursor = header_len;
    for _ in 0..child_count {
        if cursor + MIN_BLOCK_LEN > buf.len() {
            break;
        }
        match decode_object(&buf[cursor..], &mut item) {
            Ok(advance) => cursor += advance,
            Err(err) => {
                log::debug!("skipping malformed metadata object: {err}");
                break;
            }
        }
    }

    Ok(item)
}

/// Decode one mhod at the start of `buf`, storing any interpreted string
/// into `item`. Returns how far to advance: always the object's declared
/// total size, even when the string was rejected, so a bad string cannot
/// desynchronize the records that follow.
fn decode_object(buf: &[u8], item: &mut RawItem) -> Result<usize, DecodeError> {
    expect_tag(buf, 0, "mhod")?;
    let header_len = read_u32_at(buf, 4)? as usize;
    let total_len = read_u32_at(buf, 8)? as usize;
    let object_type = read_u32_at(buf, 12)?;

    let slot = match object_type {
        MHOD_TITLE => Some(&mut item.title),
        MHOD_ALBUM => Some(&mut item.album),
        MHOD_ARTIST => Some(&mut item.artist),
        _ => None,
    };

    if let Some(slot) = slot {
        // Interpreted body: encoding code, string length, 8 reserved bytes
        // (language/flags), then the payload.
        let encoding = read_u32_at(buf, header_len)?;
        let declared_len = read_u32_at(buf, header_len + 4)?;
        let payload = buf.get(header_len + 16..).unwrap_or(&[]);
        *slot = decode_string(payload, declared_len, encoding);
    }

    Ok(total_len.max(MIN_BLOCK_LEN))
}

/// Structured decode of a fully in-memory database payload (compressed
/// path, after inflation): walk the dataset chain, find the track-list
/// dataset, then iterate items by declared sizes. Sequence ids come from
/// each item's embedded identifier.
pub fn decode_structured(data: &[u8], utc_offset_secs: i32) -> Vec<TrackRecord> {
    let mut cursor = 0usize;

    while cursor + MIN_BLOCK_LEN <= data.len() {
        if let Err(err) = expect_tag(data, cursor, "mhsd") {
            log::warn!("dataset walk stopped: {err}");
            break;
        }
        let header_len = match read_u32_at(data, cursor + 4) {
            Ok(v) => v as usize,
            Err(_) => break,
        };
        let total_len = read_u32_at(data, cursor + 8).unwrap_or(0) as usize;
        let dataset_type = read_u32_at(data, cursor + 12).unwrap_or(0);

        if dataset_type == DATASET_TRACK_LIST {
            // Only one track list is extracted per database.
            let list = data.get(cursor + header_len..).unwrap_or(&[]);
            return decode_track_list(list, utc_offset_secs);
        }

        log::debug!("skipping dataset type {dataset_type} ({total_len} bytes)");
        if total_len < MIN_BLOCK_LEN {
            break;
        }
        cursor += total_len;
    }

    log::warn!("no track-list dataset found");
    Vec::new()
}

/// Decode an mhlt and its items. The declared track count is trusted but
/// iteration is also bounded by the remaining buffer, whichever runs out
/// first, to tolerate truncated files.
fn decode_track_list(buf: &[u8], utc_offset_secs: i32) -> Vec<TrackRecord> {
    if let Err(err) = expect_tag(buf, 0, "mhlt") {
        log::warn!("track-list header missing: {err}");
        return Vec::new();
    }
    let header_len = match read_u32_at(buf, 4) {
        Ok(v) => v as usize,
        Err(_) => return Vec::new(),
    };
    let declared_count = read_u32_at(buf, 8).unwrap_or(0) as usize;

    let mut tracks = Vec::new();
    let mut cursor = header_len;

    while tracks.len() < declared_count && cursor + MIN_BLOCK_LEN <= buf.len() {
        let item_buf = &buf[cursor..];
        match decode_item(item_buf, utc_offset_secs) {
            Ok(item) => {
                let advance = (item.total_len as usize).max(MIN_BLOCK_LEN);
                let embedded_id = item.embedded_id;
                tracks.push(item.into_track(embedded_id));
                cursor += advance;
            }
            Err(err) => {
                log::warn!("skipping malformed track item at offset {cursor}: {err}");
                // Skip by declared size where possible, otherwise give up on
                // the remainder of the list.
                match read_u32_at(buf, cursor + 8) {
                    Ok(total) if total as usize >= MIN_BLOCK_LEN => cursor += total as usize,
                    _ => break,
                }
            }
        }
    }

    log::info!(
        "structured decode: {} of {} declared tracks",
        tracks.len(),
        declared_count
    );
    tracks
}

/// Marker-scan decode over a file-backed source (uncompressed path).
///
/// Reads the file in fixed windows and byte-scans each window for an `m`
/// followed by `hit`; every match anchors a full item decode fetched from
/// the source by the item's declared size. Sequence ids are assigned in
/// scan order starting at 0. A marker straddling two windows is missed;
/// the windows are deliberately not overlapped, matching the historical
/// extraction exactly.
pub fn decode_scan<S: ByteSource>(
    source: &mut S,
    utc_offset_secs: i32,
) -> Result<Vec<TrackRecord>, DecodeError> {
    let head = source.read_range(0, 4)?;
    if head.len() < 4 || &head[..] != b"mhbd" {
        log::warn!("database header tag missing, scanning anyway");
    }

    let mut tracks = Vec::new();
    let mut window = vec![0u8; SCAN_WINDOW];
    let mut base = 0u64;

    loop {
        let filled = source.read_at(base, &mut window)?;
        if filled == 0 {
            break;
        }

        let mut i = 0usize;
        while i + 4 <= filled {
            if window[i] == b'm' && &window[i + 1..i + 4] == b"hit" {
                let anchor = base + i as u64;
                match decode_item_at(source, anchor, utc_offset_secs) {
                    Ok(item) => {
                        let advance = item.total_len.clamp(4, MAX_ITEM_LEN) as usize;
                        tracks.push(item.into_track(tracks.len() as u32));
                        // Jump past the decoded item so marker-like bytes
                        // inside its own strings are not matched again.
                        i += advance.min(filled - i);
                        continue;
                    }
                    Err(err) => {
                        log::debug!("marker at offset {anchor} did not decode: {err}");
                    }
                }
            }
            i += 1;
        }

        if filled < window.len() {
            break;
        }
        base += filled as u64;
    }

    log::info!("marker scan: {} tracks", tracks.len());
    Ok(tracks)
}

/// Fetch one item's bytes from the source by its declared size and decode it
fn decode_item_at<S: ByteSource>(
    source: &mut S,
    offset: u64,
    utc_offset_secs: i32,
) -> Result<RawItem, DecodeError> {
    let header = source.read_range(offset, 12)?;
    expect_tag(&header, 0, "mhit")?;
    let total_len = read_u32_at(&header, 8)?;
    let fetch = total_len.clamp(MIN_BLOCK_LEN as u32, MAX_ITEM_LEN) as usize;
    let buf = source.read_range(offset, fetch)?;
    decode_item(&buf, utc_offset_secs)
}
