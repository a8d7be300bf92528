//! Primitive field codecs shared by every record decoder
//!
//! All multi-byte integers in the database are 32-bit little-endian. Strings
//! come in two encodings selected by a per-object code, and timestamps use
//! the HFS epoch (1904-01-01) with legacy local-time semantics.

use super::error::DecodeError;

/// Seconds between 1904-01-01 and 1970-01-01
pub const HFS_EPOCH_DELTA: i64 = 2_082_844_800;

/// Declared string lengths at or above this are treated as corrupt
const MAX_PLAUSIBLE_STRING_LEN: u32 = 10_000;

/// Read a little-endian u32 at `off` within `buf`
pub fn read_u32_at(buf: &[u8], off: usize) -> Result<u32, DecodeError> {
    let bytes = buf
        .get(off..off + 4)
        .ok_or_else(|| DecodeError::truncated(off as u64, 4))?;
    Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read a 4-byte ASCII record marker at `off` within `buf`
pub fn read_tag_at(buf: &[u8], off: usize) -> Result<[u8; 4], DecodeError> {
    let bytes = buf
        .get(off..off + 4)
        .ok_or_else(|| DecodeError::truncated(off as u64, 4))?;
    Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Check a marker at `off`, reporting a `TagMismatch` when it differs
pub fn expect_tag(buf: &[u8], off: usize, expected: &'static str) -> Result<(), DecodeError> {
    let found = read_tag_at(buf, off)?;
    if found != expected.as_bytes() {
        return Err(DecodeError::TagMismatch {
            expected,
            found: String::from_utf8_lossy(&found).into_owned(),
            offset: off as u64,
        });
    }
    Ok(())
}

/// Decode a string payload per the database's per-object encoding code.
///
/// Code 1 is UTF-16LE; everything else is taken as UTF-8. Embedded NULs are
/// stripped after decoding. A declared length of zero, or one at or beyond
/// the plausibility bound, is rejected as a corrupt length field and decoded
/// as the empty string, so a bad mhod cannot poison the rest of the scan.
pub fn decode_string(payload: &[u8], declared_len: u32, encoding: u32) -> String {
    if declared_len == 0 || declared_len >= MAX_PLAUSIBLE_STRING_LEN {
        return String::new();
    }
    let len = (declared_len as usize).min(payload.len());
    let bytes = &payload[..len];

    let decoded = if encoding == 1 {
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).into_owned()
    };

    decoded.chars().filter(|&c| c != '\0').collect()
}

/// Convert an HFS-epoch timestamp to unix epoch seconds.
///
/// Zero is the "never played" sentinel and maps to zero. The local UTC
/// offset is added because the device stored wall-clock local time; the
/// offset is a parameter so library code never reads ambient timezone state
/// and tests stay deterministic. This reproduces the historical behavior
/// exactly, including its dependence on the decoding machine's timezone.
pub fn hfs_to_unix(hfs_secs: u32, utc_offset_secs: i32) -> i64 {
    if hfs_secs == 0 {
        return 0;
    }
    i64::from(hfs_secs) - HFS_EPOCH_DELTA + i64::from(utc_offset_secs)
}
