//! Document: the ordered lines of the open file.
//!
//! A `Document` is an array of [`Line`]s, each backed by one slot of the
//! [`Arena`]. The array order is display order. Lines are plain bytes; the
//! editor does not interpret encodings.
//!
//! # Design choices
//!
//! - **Bounded.** The line array never grows past the arena capacity and a
//!   line never grows past its slot. Edits that would cross a bound fail
//!   with an [`EditError`] and leave the document untouched, except
//!   [`line_insert_char`](Document::line_insert_char), which silently drops
//!   the character on a full line.
//!
//! - **Shifting, not gap buffers.** Inserting or deleting a line shifts the
//!   array; inserting or deleting bytes shifts the tail of the line. Both
//!   are O(n) in count or length, which is fine at these sizes.
//!
//! - **Out-of-range positions clamp.** Line indices and columns passed in
//!   are clamped to the valid range rather than rejected, so command code
//!   can pass the cursor through without pre-checking.
//!
//! Every mutator sets the dirty flag.

use std::fmt;

use crate::arena::{Arena, SlotId};
use crate::error::EditError;

// ---------------------------------------------------------------------------
// Line
// ---------------------------------------------------------------------------

/// One line: a slot and how many of its bytes are in use.
#[derive(Debug)]
pub struct Line {
    slot: SlotId,
    len: usize,
}

impl Line {
    /// Number of bytes in the line.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the line is empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The arena slot backing this line.
    #[inline]
    #[must_use]
    pub const fn slot(&self) -> &SlotId {
        &self.slot
    }
}

// ---------------------------------------------------------------------------
// Document
// ---------------------------------------------------------------------------

/// The open file as a bounded array of byte lines.
pub struct Document {
    arena: Arena,
    lines: Vec<Line>,
    dirty: bool,
    filename: Option<String>,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// Create an empty document with room for `max_lines` lines of at most
    /// `max_line_len` bytes each.
    #[must_use]
    pub fn new(max_lines: usize, max_line_len: usize) -> Self {
        Self {
            arena: Arena::new(max_lines, max_line_len),
            lines: Vec::with_capacity(max_lines),
            dirty: false,
            filename: None,
        }
    }

    // -- Access -------------------------------------------------------------

    /// Number of lines.
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.lines.len()
    }

    /// Whether the document has no lines at all.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Maximum number of lines.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// Maximum bytes per line.
    #[inline]
    #[must_use]
    pub const fn line_capacity(&self) -> usize {
        self.arena.slot_len()
    }

    /// The bytes of line `at`, or `None` if out of range.
    #[must_use]
    pub fn line(&self, at: usize) -> Option<&[u8]> {
        let line = self.lines.get(at)?;
        Some(&self.arena.bytes(&line.slot)[..line.len])
    }

    /// Length of line `at` (0 if out of range).
    #[inline]
    #[must_use]
    pub fn line_len(&self, at: usize) -> usize {
        self.lines.get(at).map_or(0, Line::len)
    }

    /// Iterate over the bytes of every line, in order.
    pub fn lines(&self) -> impl Iterator<Item = &[u8]> {
        self.lines
            .iter()
            .map(|line| &self.arena.bytes(&line.slot)[..line.len])
    }

    /// The line records themselves (slot + length).
    #[inline]
    #[must_use]
    pub fn raw_lines(&self) -> &[Line] {
        &self.lines
    }

    /// Whether the document changed since it was loaded or last saved.
    #[inline]
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Clear the dirty flag (after loading or saving).
    #[inline]
    pub const fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// The file name, if the document is backed by a file.
    #[inline]
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Set the file name used for the status line and for saving.
    pub fn set_filename(&mut self, name: impl Into<String>) {
        self.filename = Some(name.into());
    }

    // -- Line operations ----------------------------------------------------

    /// Insert an empty line at `at` (clamped to `0..=count`), shifting the
    /// following lines down. Returns the index of the new line.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::LinesExhausted`] when the arena is full; the
    /// document is unchanged.
    pub fn insert_line(&mut self, at: usize) -> Result<usize, EditError> {
        let slot = self.arena.acquire()?;
        let at = at.min(self.lines.len());
        self.lines.insert(at, Line { slot, len: 0 });
        self.dirty = true;
        Ok(at)
    }

    /// Replace the contents of line `at` with `bytes`, truncating to the
    /// line capacity. Returns the number of bytes stored, or `None` if `at`
    /// is out of range.
    pub fn set_line(&mut self, at: usize, bytes: &[u8]) -> Option<usize> {
        let line = self.lines.get_mut(at)?;
        let len = bytes.len().min(self.arena.slot_len());
        self.arena.bytes_mut(&line.slot)[..len].copy_from_slice(&bytes[..len]);
        line.len = len;
        self.dirty = true;
        Some(len)
    }

    /// Append a line holding `bytes` (truncated to the line capacity).
    /// Used by the file loader.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::LinesExhausted`] when the arena is full.
    pub fn append_line(&mut self, bytes: &[u8]) -> Result<usize, EditError> {
        let at = self.insert_line(self.lines.len())?;
        self.set_line(at, bytes);
        Ok(at)
    }

    /// Delete line `at` (clamped to the last line) and return its storage to
    /// the arena. No-op on an empty document.
    pub fn delete_line(&mut self, at: usize) {
        if self.lines.is_empty() {
            return;
        }
        let at = at.min(self.lines.len() - 1);
        let line = self.lines.remove(at);
        self.arena.release(line.slot);
        self.dirty = true;
    }

    /// Split line `at` at byte `col`: the suffix from `col` moves to a new
    /// line right after it. Returns `Ok(true)` if a split happened, and
    /// `Ok(false)` (no change) when `at` is out of range or `col` is at or
    /// past the end of the line.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::LinesExhausted`] when no slot is free for the
    /// new line; the document is unchanged.
    pub fn split_line(&mut self, at: usize, col: usize) -> Result<bool, EditError> {
        let Some(len) = self.lines.get(at).map(Line::len) else {
            return Ok(false);
        };
        if col >= len {
            return Ok(false);
        }

        let new_at = self.insert_line(at + 1)?;
        let tail = len - col;
        {
            let (src, dst) = self
                .arena
                .pair_mut(&self.lines[at].slot, &self.lines[new_at].slot);
            dst[..tail].copy_from_slice(&src[col..len]);
        }
        self.lines[new_at].len = tail;
        self.lines[at].len = col;
        self.dirty = true;
        Ok(true)
    }

    /// Join line `at + 1` onto the end of line `at`.
    ///
    /// Exactly one space separates the two parts unless either adjoining
    /// byte is already whitespace; an empty side counts as whitespace. The
    /// joined line is deleted. No-op when there is no line after `at`.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::LineTooLong`] when the result would not fit in
    /// one line; the document is unchanged.
    pub fn join_lines(&mut self, at: usize) -> Result<(), EditError> {
        if at + 1 >= self.lines.len() {
            return Ok(());
        }

        let dst_len = self.lines[at].len;
        let src_len = self.lines[at + 1].len;

        if src_len > 0 {
            let last = self.line(at).and_then(<[u8]>::last).copied();
            let first = self.line(at + 1).and_then(<[u8]>::first).copied();
            let add_space = match (last, first) {
                (Some(l), Some(f)) => !is_space(l) && !is_space(f),
                _ => false,
            };

            let joined = dst_len + usize::from(add_space) + src_len;
            if joined > self.arena.slot_len() {
                return Err(EditError::LineTooLong {
                    max: self.arena.slot_len(),
                });
            }

            let (src, dst) = self
                .arena
                .pair_mut(&self.lines[at + 1].slot, &self.lines[at].slot);
            let mut end = dst_len;
            if add_space {
                dst[end] = b' ';
                end += 1;
            }
            dst[end..end + src_len].copy_from_slice(&src[..src_len]);
            self.lines[at].len = joined;
        }

        self.delete_line(at + 1);
        self.dirty = true;
        Ok(())
    }

    /// Truncate line `at` to `col` bytes. No-op if `at` is out of range or
    /// the line is already shorter.
    pub fn crop_line(&mut self, at: usize, col: usize) {
        if let Some(line) = self.lines.get_mut(at) {
            line.len = line.len.min(col);
            self.dirty = true;
        }
    }

    // -- Character operations -----------------------------------------------

    /// Insert byte `c` into line `line` at `at` (clamped to the line length).
    ///
    /// Returns `false` without changing anything when the line is full or
    /// `line` is out of range.
    pub fn line_insert_char(&mut self, line: usize, at: usize, c: u8) -> bool {
        let cap = self.arena.slot_len();
        let Some(l) = self.lines.get_mut(line) else {
            return false;
        };
        if l.len >= cap {
            return false;
        }

        let at = at.min(l.len);
        let bytes = self.arena.bytes_mut(&l.slot);
        bytes.copy_within(at..l.len, at + 1);
        bytes[at] = c;
        l.len += 1;
        self.dirty = true;
        true
    }

    /// Delete up to `n` bytes of line `line` starting at `at`.
    ///
    /// No-op when `at` is at or past the end of the line; `n` is clamped to
    /// the bytes that remain.
    pub fn delete_chars(&mut self, line: usize, at: usize, n: usize) {
        let Some(l) = self.lines.get_mut(line) else {
            return;
        };
        if at >= l.len || n == 0 {
            return;
        }

        let end = at.saturating_add(n).min(l.len);
        self.arena.bytes_mut(&l.slot).copy_within(end..l.len, at);
        l.len -= end - at;
        self.dirty = true;
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("count", &self.count())
            .field("capacity", &self.capacity())
            .field("dirty", &self.dirty)
            .field("filename", &self.filename)
            .finish_non_exhaustive()
    }
}

/// `isspace` in the C locale: space, \t, \n, \v, \f, \r.
#[inline]
const fn is_space(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | 0x0b | 0x0c | b'\r')
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashSet;

    fn doc_with(lines: &[&str]) -> Document {
        let mut doc = Document::new(16, 64);
        for line in lines {
            doc.append_line(line.as_bytes()).unwrap();
        }
        doc.mark_clean();
        doc
    }

    fn text(doc: &Document) -> Vec<String> {
        doc.lines()
            .map(|l| String::from_utf8_lossy(l).into_owned())
            .collect()
    }

    // -- insert_line / delete_line -------------------------------------------

    #[test]
    fn new_document_is_empty_and_clean() {
        let doc = Document::new(4, 16);
        assert!(doc.is_empty());
        assert_eq!(doc.count(), 0);
        assert!(!doc.is_dirty());
        assert_eq!(doc.filename(), None);
    }

    #[test]
    fn insert_line_shifts_and_marks_dirty() {
        let mut doc = doc_with(&["a", "b"]);
        assert_eq!(doc.insert_line(1), Ok(1));
        assert_eq!(text(&doc), vec!["a", "", "b"]);
        assert!(doc.is_dirty());
    }

    #[test]
    fn insert_line_clamps_position() {
        let mut doc = doc_with(&["a"]);
        assert_eq!(doc.insert_line(99), Ok(1));
        assert_eq!(text(&doc), vec!["a", ""]);
    }

    #[test]
    fn insert_line_fails_when_pool_is_full() {
        let mut doc = Document::new(2, 8);
        doc.append_line(b"a").unwrap();
        doc.append_line(b"b").unwrap();
        doc.mark_clean();
        assert_eq!(doc.insert_line(0), Err(EditError::LinesExhausted));
        assert_eq!(text(&doc), vec!["a", "b"]);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn delete_line_shifts_up() {
        let mut doc = doc_with(&["a", "b", "c"]);
        doc.delete_line(1);
        assert_eq!(text(&doc), vec!["a", "c"]);
        assert!(doc.is_dirty());
    }

    #[test]
    fn delete_line_clamps_to_last() {
        let mut doc = doc_with(&["a", "b"]);
        doc.delete_line(42);
        assert_eq!(text(&doc), vec!["a"]);
    }

    #[test]
    fn delete_line_on_empty_document_is_noop() {
        let mut doc = Document::new(4, 8);
        doc.delete_line(0);
        assert!(doc.is_empty());
        assert!(!doc.is_dirty());
    }

    #[test]
    fn deleted_storage_is_reused() {
        let mut doc = Document::new(1, 8);
        doc.append_line(b"a").unwrap();
        doc.delete_line(0);
        assert_eq!(doc.insert_line(0), Ok(0));
        assert_eq!(doc.line(0), Some(&b""[..]));
    }

    #[test]
    fn count_never_exceeds_capacity_and_slots_never_alias() {
        let mut doc = Document::new(5, 8);
        for step in 0..200usize {
            // Cheap deterministic mix of inserts and deletes.
            if step.wrapping_mul(7) % 5 < 3 {
                let _ = doc.insert_line(step % 7);
            } else {
                doc.delete_line(step % 3);
            }
            assert!(doc.count() <= doc.capacity());
            let slots: HashSet<_> = doc.raw_lines().iter().map(|l| l.slot().index()).collect();
            assert_eq!(slots.len(), doc.count());
        }
    }

    // -- set_line / append_line -----------------------------------------------

    #[test]
    fn set_line_truncates_to_capacity() {
        let mut doc = Document::new(2, 4);
        doc.insert_line(0).unwrap();
        assert_eq!(doc.set_line(0, b"abcdef"), Some(4));
        assert_eq!(doc.line(0), Some(&b"abcd"[..]));
    }

    #[test]
    fn set_line_out_of_range() {
        let mut doc = Document::new(2, 4);
        assert_eq!(doc.set_line(0, b"x"), None);
    }

    // -- split_line -----------------------------------------------------------

    #[test]
    fn split_line_moves_suffix() {
        let mut doc = doc_with(&["hello world"]);
        assert_eq!(doc.split_line(0, 5), Ok(true));
        assert_eq!(text(&doc), vec!["hello", " world"]);
    }

    #[test]
    fn split_line_at_start_leaves_empty_prefix() {
        let mut doc = doc_with(&["abc"]);
        assert_eq!(doc.split_line(0, 0), Ok(true));
        assert_eq!(text(&doc), vec!["", "abc"]);
    }

    #[test]
    fn split_line_at_or_past_end_is_noop() {
        let mut doc = doc_with(&["abc"]);
        assert_eq!(doc.split_line(0, 3), Ok(false));
        assert_eq!(doc.split_line(0, 10), Ok(false));
        assert_eq!(doc.split_line(5, 0), Ok(false));
        assert_eq!(text(&doc), vec!["abc"]);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn split_line_fails_when_pool_is_full() {
        let mut doc = Document::new(1, 16);
        doc.append_line(b"abc").unwrap();
        assert_eq!(doc.split_line(0, 1), Err(EditError::LinesExhausted));
        assert_eq!(text(&doc), vec!["abc"]);
    }

    // -- join_lines -------------------------------------------------------------

    #[test]
    fn join_inserts_single_space() {
        let mut doc = doc_with(&["foo", "bar"]);
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["foo bar"]);
    }

    #[test]
    fn join_respects_existing_whitespace() {
        let mut doc = doc_with(&["foo ", "bar", "baz", "\tqux"]);
        doc.join_lines(0).unwrap();
        doc.join_lines(1).unwrap();
        assert_eq!(text(&doc), vec!["foo bar", "baz\tqux"]);
    }

    #[test]
    fn join_onto_empty_line_adds_no_space() {
        let mut doc = doc_with(&["", "bar"]);
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["bar"]);
    }

    #[test]
    fn join_with_empty_next_line_drops_it() {
        let mut doc = doc_with(&["foo", ""]);
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["foo"]);
    }

    #[test]
    fn join_single_line_is_noop() {
        let mut doc = doc_with(&["foo"]);
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["foo"]);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn join_last_line_is_noop() {
        let mut doc = doc_with(&["a", "b"]);
        doc.join_lines(1).unwrap();
        assert_eq!(text(&doc), vec!["a", "b"]);
    }

    #[test]
    fn join_too_long_fails_without_change() {
        let mut doc = Document::new(4, 6);
        doc.append_line(b"abc").unwrap();
        doc.append_line(b"def").unwrap();
        assert_eq!(doc.join_lines(0), Err(EditError::LineTooLong { max: 6 }));
        assert_eq!(text(&doc), vec!["abc", "def"]);
    }

    #[test]
    fn split_then_join_restores_when_whitespace_adjoins() {
        let mut doc = doc_with(&["hello world"]);
        doc.split_line(0, 5).unwrap();
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["hello world"]);
    }

    #[test]
    fn split_then_join_adds_one_space_otherwise() {
        let mut doc = doc_with(&["helloworld"]);
        doc.split_line(0, 5).unwrap();
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["hello world"]);
        // Only one line left: joining again changes nothing.
        doc.join_lines(0).unwrap();
        assert_eq!(text(&doc), vec!["hello world"]);
    }

    // -- crop_line ----------------------------------------------------------------

    #[test]
    fn crop_line_truncates() {
        let mut doc = doc_with(&["abcdef"]);
        doc.crop_line(0, 2);
        assert_eq!(text(&doc), vec!["ab"]);
        doc.crop_line(0, 10);
        assert_eq!(text(&doc), vec!["ab"]);
    }

    // -- line_insert_char ------------------------------------------------------------

    #[test]
    fn insert_char_shifts_tail() {
        let mut doc = doc_with(&["ac"]);
        assert!(doc.line_insert_char(0, 1, b'b'));
        assert_eq!(text(&doc), vec!["abc"]);
    }

    #[test]
    fn insert_char_clamps_to_end() {
        let mut doc = doc_with(&["ab"]);
        assert!(doc.line_insert_char(0, 99, b'c'));
        assert_eq!(text(&doc), vec!["abc"]);
    }

    #[test]
    fn insert_char_on_full_line_is_noop() {
        let mut doc = Document::new(2, 3);
        doc.append_line(b"abc").unwrap();
        doc.mark_clean();
        assert!(!doc.line_insert_char(0, 0, b'x'));
        assert_eq!(text(&doc), vec!["abc"]);
        assert!(!doc.is_dirty());
    }

    // -- delete_chars ------------------------------------------------------------------

    #[test]
    fn delete_chars_removes_range() {
        let mut doc = doc_with(&["hello world"]);
        doc.delete_chars(0, 0, 6);
        assert_eq!(text(&doc), vec!["world"]);
    }

    #[test]
    fn delete_chars_clamps_count() {
        let mut doc = doc_with(&["hello"]);
        doc.delete_chars(0, 3, 100);
        assert_eq!(text(&doc), vec!["hel"]);
    }

    #[test]
    fn delete_chars_past_end_is_noop() {
        let mut doc = doc_with(&["hello"]);
        doc.delete_chars(0, 5, 1);
        doc.delete_chars(3, 0, 1);
        assert_eq!(text(&doc), vec!["hello"]);
        assert!(!doc.is_dirty());
    }

    // -- metadata ------------------------------------------------------------------------

    #[test]
    fn filename_round_trip() {
        let mut doc = Document::new(1, 1);
        doc.set_filename("notes.txt");
        assert_eq!(doc.filename(), Some("notes.txt"));
    }
}
