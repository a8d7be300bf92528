//! History assembly and decode orchestration

use super::expander::expand_track;
use crate::itunesdb::{self, playcounts};
use crate::model::{DatabaseFormat, MediaDatabase, ScrobbleEvent};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

/// Build the final play log from a decoded database: drop never-played
/// tracks, expand the rest, and sort most recent first. Equal timestamps
/// carry no guaranteed relative order.
pub fn assemble_history(database: &MediaDatabase) -> Vec<ScrobbleEvent> {
    let mut events = Vec::new();
    for track in &database.tracks {
        if track.play_count == 0 {
            continue;
        }
        let track = Arc::new(track.clone());
        events.extend(expand_track(&track));
    }
    events.sort_by(|a, b| b.played_at_unix.cmp(&a.played_at_unix));

    log::info!(
        "assembled {} play events from {} tracks",
        events.len(),
        database.track_count()
    );
    events
}

/// Full reconstruction for a device database directory: locate the
/// database, decode it, fold in the Play Counts file when the uncompressed
/// layout is in use, and assemble the sorted play log.
///
/// `utc_offset_secs` is the legacy local-time correction applied to every
/// on-device timestamp; pass the decoding machine's offset to reproduce the
/// historical behavior, or a fixed value for reproducible output.
pub fn load_history(database_dir: &Path, utc_offset_secs: i32) -> Result<Vec<ScrobbleEvent>> {
    let (path, format) = itunesdb::locate_database(database_dir)
        .with_context(|| format!("no iTunesDB or iTunesCDB in {database_dir:?}"))?;

    let mut database = itunesdb::decode_database(&path, format, utc_offset_secs)
        .with_context(|| format!("failed to decode database {path:?}"))?;

    // The compressed layout already embeds play counts per item.
    if database.format == DatabaseFormat::Uncompressed {
        playcounts::apply_play_counts(database_dir, &mut database.tracks, utc_offset_secs);
    }

    Ok(assemble_history(&database))
}
