//! Unified data model for reconstructed listening history
//!
//! This module defines data structures that are independent of
//! both input (iTunesDB / iTunesCDB) layout and output (scrobble
//! submission) concerns.

mod database;
mod event;
mod track;

pub use database::{DatabaseFormat, MediaDatabase};
pub use event::ScrobbleEvent;
pub use track::TrackRecord;
