//! iPod Scrobbler - listening-history reconstruction
//!
//! This library decodes an iPod's on-device database files (iTunesDB,
//! iTunesCDB and the auxiliary Play Counts file) and rebuilds a
//! chronologically ordered log of track plays for submission to a
//! scrobbling service.

pub mod history;
pub mod itunesdb;
pub mod model;
pub mod scrobble;

pub use history::load_history;
pub use itunesdb::DecodeError;
pub use model::{DatabaseFormat, MediaDatabase, ScrobbleEvent, TrackRecord};
