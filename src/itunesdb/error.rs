//! Decode error taxonomy
//!
//! Sub-record problems (bad tag, implausible string length, truncated nested
//! field) are recovered locally by skipping the record by its declared size,
//! so imperfect real-world files still yield a partial track list. Container
//! problems (bad outer header, failed inflate, failed open) abort the decode
//! of that file and surface to the caller.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DecodeError {
    /// Fewer bytes were available than a field requires
    #[error("truncated read at offset {offset}: needed {needed} bytes")]
    TruncatedRead { offset: u64, needed: usize },

    /// An expected record marker was not found
    #[error("expected tag `{expected}` at offset {offset}, found `{found}`")]
    TagMismatch {
        expected: &'static str,
        found: String,
        offset: u64,
    },

    /// The compressed database file does not start with a database header
    #[error("not a compressed database container (missing mhbd header)")]
    InvalidContainer,

    /// The embedded deflate stream could not be inflated
    #[error("failed to inflate embedded database payload")]
    Decompression(#[source] std::io::Error),

    /// Underlying filesystem failure
    #[error("i/o error while reading database")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub(crate) fn truncated(offset: u64, needed: usize) -> Self {
        DecodeError::TruncatedRead { offset, needed }
    }
}
