//! iPod database decoding
//!
//! Locates the device database (preferring the compressed `iTunesCDB` over
//! the plain `iTunesDB`), decodes its track list through the strategy that
//! fits the layout, and exposes the Play Counts correlation for the
//! uncompressed format.

pub mod compressed;
pub mod error;
pub mod playcounts;
pub mod primitives;
pub mod records;
pub mod source;

pub use error::DecodeError;

use crate::model::{DatabaseFormat, MediaDatabase};
use source::FileSource;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Uncompressed database file name
pub const DATABASE_FILE: &str = "iTunesDB";

/// Compressed database file name, preferred when present
pub const COMPRESSED_DATABASE_FILE: &str = "iTunesCDB";

/// Pick the database file inside a device database directory.
///
/// Detection is by filename only, no content inspection: the compressed
/// file wins whenever it exists.
pub fn locate_database(dir: &Path) -> Option<(PathBuf, DatabaseFormat)> {
    let compressed = dir.join(COMPRESSED_DATABASE_FILE);
    if compressed.exists() {
        return Some((compressed, DatabaseFormat::Compressed));
    }
    let plain = dir.join(DATABASE_FILE);
    if plain.exists() {
        return Some((plain, DatabaseFormat::Uncompressed));
    }
    None
}

/// Decode one database file into its track list.
///
/// All state is created fresh per call and the file handle is released on
/// every exit path; decoding the same file twice yields identical output.
pub fn decode_database(
    path: &Path,
    format: DatabaseFormat,
    utc_offset_secs: i32,
) -> Result<MediaDatabase, DecodeError> {
    log::info!("decoding {format:?} database at {path:?}");
    let mut source = FileSource::new(File::open(path)?);

    let tracks = match format {
        DatabaseFormat::Compressed => {
            let inflated = compressed::unwrap_container(&mut source)?;
            records::decode_structured(&inflated, utc_offset_secs)
        }
        DatabaseFormat::Uncompressed => records::decode_scan(&mut source, utc_offset_secs)?,
    };

    Ok(MediaDatabase { format, tracks })
}
