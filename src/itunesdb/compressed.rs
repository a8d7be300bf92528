//! Compressed container (`iTunesCDB`) unwrapping
//!
//! The compressed database keeps the plain `mhbd` header, then replaces the
//! record payload with a zlib stream. The header-size field gives the
//! payload offset; the stream is inflated in one shot and the structured
//! decoder runs over the resulting buffer.

use super::error::DecodeError;
use super::primitives::read_u32_at;
use super::source::ByteSource;
use std::io::Read;

/// Upper bound on the compressed payload; real databases are a few MiB
const MAX_PAYLOAD_LEN: u64 = 64 * 1024 * 1024;

/// Bytes of zlib wrapper preceding the raw deflate stream
const ZLIB_PREFIX_LEN: usize = 2;

/// Validate the outer header and inflate the embedded payload.
///
/// A missing `mhbd` tag or a failed inflate is fatal for the file: unlike
/// sub-record damage there is nothing to extract past it.
pub fn unwrap_container<S: ByteSource>(source: &mut S) -> Result<Vec<u8>, DecodeError> {
    let header = source.read_range(0, 8)?;
    if header.len() < 8 || &header[0..4] != b"mhbd" {
        return Err(DecodeError::InvalidContainer);
    }
    let payload_offset = u64::from(read_u32_at(&header, 4)?);

    let available = source.len()?.saturating_sub(payload_offset);
    let fetch = available.min(MAX_PAYLOAD_LEN) as usize;
    let payload = source.read_range(payload_offset, fetch)?;
    if payload.len() <= ZLIB_PREFIX_LEN {
        return Err(DecodeError::truncated(payload_offset, ZLIB_PREFIX_LEN + 1));
    }

    let mut inflated = Vec::new();
    let mut decoder = flate2::read::DeflateDecoder::new(&payload[ZLIB_PREFIX_LEN..]);
    decoder
        .read_to_end(&mut inflated)
        .map_err(DecodeError::Decompression)?;

    log::debug!(
        "inflated {} payload bytes into {}",
        payload.len(),
        inflated.len()
    );
    Ok(inflated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::itunesdb::source::MemorySource;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::Write;

    fn build_container(payload: &[u8]) -> Vec<u8> {
        let header_len = 0xa8u32;
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).unwrap();
        let compressed = encoder.finish().unwrap();

        let mut out = Vec::new();
        out.extend_from_slice(b"mhbd");
        out.extend_from_slice(&header_len.to_le_bytes());
        out.resize(header_len as usize, 0);
        out.extend_from_slice(&compressed);
        out
    }

    #[test]
    fn test_round_trip_inflate() {
        let payload = b"mhsd pretend payload".repeat(40);
        let mut source = MemorySource::new(build_container(&payload));
        let inflated = unwrap_container(&mut source).unwrap();
        assert_eq!(inflated, payload);
    }

    #[test]
    fn test_wrong_leading_tag_is_invalid_container() {
        let mut source = MemorySource::new(b"mhbX\x20\x00\x00\x00rest".to_vec());
        assert!(matches!(
            unwrap_container(&mut source),
            Err(DecodeError::InvalidContainer)
        ));
    }

    #[test]
    fn test_garbage_payload_is_decompression_error() {
        let mut out = Vec::new();
        out.extend_from_slice(b"mhbd");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.resize(16, 0);
        out.extend_from_slice(&[0x78, 0x9c]); // zlib prefix
        out.extend_from_slice(&[0xff; 32]); // not a deflate stream
        let mut source = MemorySource::new(out);
        assert!(matches!(
            unwrap_container(&mut source),
            Err(DecodeError::Decompression(_))
        ));
    }
}
