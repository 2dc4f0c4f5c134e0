// SPDX-License-Identifier: MIT
//
// Bounded frame output.
//
// `ScreenBuffer` accumulates every byte of a frame (escape sequences and
// text) in memory so the whole frame reaches the terminal in a single
// write() syscall. Many small writes let the terminal paint half a frame,
// which shows up as flicker.
//
// The buffer has a hard capacity fixed at construction. It never grows:
// an append that would cross the limit is refused whole and reported as
// `Overflow`, leaving the bytes already accumulated intact.

use std::io::{self, Write};

use thiserror::Error;

/// Default frame capacity: 64 KiB.
pub const DEFAULT_CAPACITY: usize = 1 << 16;

/// An append did not fit into the remaining capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("screen buffer overflow: {requested} bytes requested, {available} available")]
pub struct Overflow {
    /// Bytes the caller tried to append.
    pub requested: usize,
    /// Bytes that were still free.
    pub available: usize,
}

// ─── ScreenBuffer ────────────────────────────────────────────────────────────

/// A fixed-capacity byte buffer for one frame of terminal output.
pub struct ScreenBuffer {
    buf: Vec<u8>,
    capacity: usize,
}

impl ScreenBuffer {
    /// Create an empty buffer holding at most `capacity` bytes.
    ///
    /// The storage is reserved up front; appends never reallocate.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of bytes accumulated.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether the buffer is empty.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Hard byte limit.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes still free.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.buf.len()
    }

    /// The accumulated bytes.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Append `bytes` if they fit entirely.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`] without writing anything if the bytes don't fit.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), Overflow> {
        if bytes.len() > self.remaining() {
            return Err(Overflow {
                requested: bytes.len(),
                available: self.remaining(),
            });
        }
        self.buf.extend_from_slice(bytes);
        Ok(())
    }

    /// Append `n` copies of `byte`.
    ///
    /// # Errors
    ///
    /// Returns [`Overflow`] without writing anything if they don't fit.
    pub fn fill(&mut self, byte: u8, n: usize) -> Result<(), Overflow> {
        if n > self.remaining() {
            return Err(Overflow {
                requested: n,
                available: self.remaining(),
            });
        }
        self.buf.resize(self.buf.len() + n, byte);
        Ok(())
    }

    /// Clear the buffer for reuse (keeps allocated capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Write accumulated output to `w` in one call and clear the buffer.
    ///
    /// # Errors
    ///
    /// Returns an error if writing to `w` fails.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            w.write_all(&self.buf)?;
            w.flush()?;
            self.buf.clear();
        }
        Ok(())
    }
}

impl Default for ScreenBuffer {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

/// `Write` adapter so the [`ansi`](crate::ansi) helpers can target the
/// buffer directly. Overflow surfaces as `io::ErrorKind::WriteZero`.
impl Write for ScreenBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf)
            .map_err(|e| io::Error::new(io::ErrorKind::WriteZero, e))?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Real flushing happens in flush_to().
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_buffer_is_empty() {
        let buf = ScreenBuffer::with_capacity(16);
        assert!(buf.is_empty());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.remaining(), 16);
    }

    #[test]
    fn default_capacity() {
        assert_eq!(ScreenBuffer::default().capacity(), 65_536);
    }

    #[test]
    fn append_accumulates() {
        let mut buf = ScreenBuffer::with_capacity(16);
        buf.append(b"abc").unwrap();
        buf.append(b"de").unwrap();
        assert_eq!(buf.as_bytes(), b"abcde");
        assert_eq!(buf.remaining(), 11);
    }

    #[test]
    fn append_exactly_to_capacity() {
        let mut buf = ScreenBuffer::with_capacity(4);
        buf.append(b"abcd").unwrap();
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn overflow_is_refused_whole() {
        let mut buf = ScreenBuffer::with_capacity(4);
        buf.append(b"ab").unwrap();
        let err = buf.append(b"cde").unwrap_err();
        assert_eq!(
            err,
            Overflow {
                requested: 3,
                available: 2
            }
        );
        assert_eq!(buf.as_bytes(), b"ab");
    }

    #[test]
    fn fill_repeats_byte() {
        let mut buf = ScreenBuffer::with_capacity(8);
        buf.fill(b' ', 3).unwrap();
        assert_eq!(buf.as_bytes(), b"   ");
        assert!(buf.fill(b' ', 6).is_err());
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn never_reallocates() {
        let mut buf = ScreenBuffer::with_capacity(32);
        let ptr = buf.as_bytes().as_ptr();
        for _ in 0..8 {
            buf.append(b"abcd").unwrap();
        }
        assert_eq!(buf.as_bytes().as_ptr(), ptr);
    }

    #[test]
    fn write_trait_reports_overflow() {
        let mut buf = ScreenBuffer::with_capacity(4);
        write!(buf, "ab").unwrap();
        let err = write!(buf, "cdef").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn flush_to_writes_once_and_clears() {
        let mut buf = ScreenBuffer::with_capacity(16);
        buf.append(b"frame").unwrap();
        let mut out = Vec::new();
        buf.flush_to(&mut out).unwrap();
        assert_eq!(out, b"frame");
        assert!(buf.is_empty());
    }

    #[test]
    fn clear_keeps_capacity() {
        let mut buf = ScreenBuffer::with_capacity(16);
        buf.append(b"frame").unwrap();
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), 16);
    }
}
