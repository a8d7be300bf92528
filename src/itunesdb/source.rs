//! Random-access byte sources
//!
//! The record decoder runs over either the database file itself or the
//! in-memory buffer produced by inflating a compressed container. Both are
//! exposed through one trait so the decode logic exists once.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};

/// Abstraction over a random-access byte range
pub trait ByteSource {
    /// Read up to `buf.len()` bytes starting at `offset`. A short read means
    /// end of data, not an error.
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize>;

    /// Total number of bytes available
    fn len(&mut self) -> io::Result<u64>;

    /// Read exactly `len` bytes at `offset`, truncated at end of data
    fn read_range(&mut self, offset: u64, len: usize) -> io::Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        let n = self.read_at(offset, &mut buf)?;
        buf.truncate(n);
        Ok(buf)
    }
}

/// Seekable file-backed source; the handle is closed when the source drops
pub struct FileSource {
    file: File,
}

impl FileSource {
    pub fn new(file: File) -> Self {
        Self { file }
    }
}

impl ByteSource for FileSource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        self.file.seek(SeekFrom::Start(offset))?;
        let mut total = 0;
        // Loop until the buffer is full or the file ends; a single read may
        // legitimately return fewer bytes than requested.
        while total < buf.len() {
            let n = self.file.read(&mut buf[total..])?;
            if n == 0 {
                break;
            }
            total += n;
        }
        Ok(total)
    }

    fn len(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }
}

/// In-memory source over an owned buffer (the inflated compressed payload)
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Borrow the whole underlying buffer
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }
}

impl ByteSource for MemorySource {
    fn read_at(&mut self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let start = usize::try_from(offset).unwrap_or(usize::MAX);
        if start >= self.data.len() {
            return Ok(0);
        }
        let end = (start + buf.len()).min(self.data.len());
        let n = end - start;
        buf[..n].copy_from_slice(&self.data[start..end]);
        Ok(n)
    }

    fn len(&mut self) -> io::Result<u64> {
        Ok(self.data.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_source_reads_in_bounds() {
        let mut src = MemorySource::new(vec![1, 2, 3, 4, 5]);
        let mut buf = [0u8; 3];
        assert_eq!(src.read_at(1, &mut buf).unwrap(), 3);
        assert_eq!(buf, [2, 3, 4]);
    }

    #[test]
    fn test_memory_source_short_read_at_end() {
        let mut src = MemorySource::new(vec![9, 9]);
        let mut buf = [0u8; 8];
        assert_eq!(src.read_at(1, &mut buf).unwrap(), 1);
        assert_eq!(src.read_at(5, &mut buf).unwrap(), 0);
    }

    #[test]
    fn test_read_range_truncates() {
        let mut src = MemorySource::new(vec![7; 4]);
        let out = src.read_range(2, 10).unwrap();
        assert_eq!(out, vec![7, 7]);
    }
}
