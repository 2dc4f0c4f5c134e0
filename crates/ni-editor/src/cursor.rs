//! Cursor and viewport.
//!
//! The [`Cursor`] is a logical `(col, row)` position in the document, in
//! bytes and lines, plus the rendered column derived from it. The
//! [`Viewport`] is the window of the document that fits on screen.
//!
//! # Cursor limits
//!
//! Movement takes a `past_end` flag rather than a [`Mode`](crate::mode::Mode):
//!
//! - **Normal**: `past_end = false`, the cursor sits ON a byte
//!   (`col <= len - 1`, or 0 on an empty line).
//! - **Insert**: `past_end = true`, the cursor may sit after the last byte
//!   (`col <= len`).
//!
//! There is no sticky column. Moving up or down re-clamps the column to the
//! destination line and forgets the old one.
//!
//! # Rendered columns
//!
//! Tabs render wider than one byte, so the screen column differs from the
//! byte column. [`cx2rx`] maps one to the other; the viewport scrolls on
//! rendered columns.

use crate::config::UTIL_LINES;
use crate::document::Document;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Rendered column of byte column `col` in `line`.
///
/// Each tab advances to the next multiple of `tab_stop`; every other byte
/// takes one column. Columns past the end of the line (the Insert-mode
/// append position) count one each.
#[must_use]
pub fn cx2rx(col: usize, line: &[u8], tab_stop: usize) -> usize {
    let tab_stop = tab_stop.max(1);
    let within = col.min(line.len());
    let mut rx = 0;

    for &b in &line[..within] {
        if b == b'\t' {
            rx += tab_stop - rx % tab_stop;
        } else {
            rx += 1;
        }
    }

    rx + (col - within)
}

/// Highest column the cursor may take on a line of `len` bytes.
#[inline]
#[must_use]
pub const fn max_col(len: usize, past_end: bool) -> usize {
    if past_end { len } else { len.saturating_sub(1) }
}

// ---------------------------------------------------------------------------
// Cursor
// ---------------------------------------------------------------------------

/// One-step movement direction (`h j k l` and the arrow keys).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A cursor in the document.
///
/// Does not reference the document; it is passed to the methods that need
/// it.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    /// Byte column in the current line.
    col: usize,

    /// Line index.
    row: usize,

    /// Screen column of `col` in the current line, refreshed by
    /// [`Viewport::scroll`].
    render_col: usize,
}

impl Cursor {
    /// A cursor at the origin.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            col: 0,
            row: 0,
            render_col: 0,
        }
    }

    /// A cursor at `(col, row)`.
    #[must_use]
    pub const fn at(col: usize, row: usize) -> Self {
        Self {
            col,
            row,
            render_col: col,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Byte column.
    #[inline]
    #[must_use]
    pub const fn col(&self) -> usize {
        self.col
    }

    /// Line index.
    #[inline]
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Rendered column, as of the last [`Viewport::scroll`].
    #[inline]
    #[must_use]
    pub const fn render_col(&self) -> usize {
        self.render_col
    }

    /// Set the byte column without clamping.
    #[inline]
    pub const fn set_col(&mut self, col: usize) {
        self.col = col;
    }

    /// Set the line without clamping.
    #[inline]
    pub const fn set_row(&mut self, row: usize) {
        self.row = row;
    }

    // -- Movement -----------------------------------------------------------

    /// Move one step in `dir`, staying inside the document.
    ///
    /// The column is then clamped to the line the cursor ends up on.
    pub fn step(&mut self, dir: Direction, doc: &Document, past_end: bool) {
        let len = doc.line_len(self.row);
        match dir {
            Direction::Up => self.row = self.row.saturating_sub(1),
            Direction::Down => {
                if self.row + 1 < doc.count() {
                    self.row += 1;
                }
            }
            Direction::Left => self.col = self.col.saturating_sub(1),
            Direction::Right => {
                if self.col < max_col(len, past_end) {
                    self.col += 1;
                }
            }
        }
        self.clamp(doc, past_end);
    }

    /// Move `n` lines down, stopping at the last line.
    pub fn move_down(&mut self, n: usize, doc: &Document, past_end: bool) {
        let last = doc.count().saturating_sub(1);
        self.row = self.row.saturating_add(n).min(last);
        self.clamp(doc, past_end);
    }

    /// Move `n` lines up, stopping at the first line.
    pub fn move_up(&mut self, n: usize, doc: &Document, past_end: bool) {
        self.row = self.row.saturating_sub(n);
        self.clamp(doc, past_end);
    }

    /// Pull the cursor back inside the document and the current line.
    pub fn clamp(&mut self, doc: &Document, past_end: bool) {
        if doc.is_empty() {
            self.row = 0;
            self.col = 0;
            return;
        }
        self.row = self.row.min(doc.count() - 1);
        self.col = self.col.min(max_col(doc.line_len(self.row), past_end));
    }

    /// Enforce the Normal-mode invariant: row on an existing line and col on
    /// an existing byte (both 0 when there is nothing to sit on).
    ///
    /// Idempotent.
    #[inline]
    pub fn normalize(&mut self, doc: &Document) {
        self.clamp(doc, false);
    }
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// The visible window onto the document.
///
/// The screen has `rows` rows; the last [`UTIL_LINES`] of them hold the
/// status and message lines, the rest show text.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    /// First visible line.
    row_offset: usize,

    /// First visible rendered column.
    col_offset: usize,

    /// Screen rows, including the status and message rows.
    rows: usize,

    /// Screen columns.
    cols: usize,
}

impl Viewport {
    /// A viewport at the top-left of the document.
    #[must_use]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self {
            row_offset: 0,
            col_offset: 0,
            rows,
            cols,
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// First visible line.
    #[inline]
    #[must_use]
    pub const fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// First visible rendered column.
    #[inline]
    #[must_use]
    pub const fn col_offset(&self) -> usize {
        self.col_offset
    }

    /// Screen rows.
    #[inline]
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Screen columns.
    #[inline]
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Rows available for document text.
    #[inline]
    #[must_use]
    pub const fn text_rows(&self) -> usize {
        self.rows.saturating_sub(UTIL_LINES)
    }

    /// Adopt a new screen size. Offsets are fixed up by the next
    /// [`scroll`](Self::scroll).
    pub const fn resize(&mut self, rows: usize, cols: usize) {
        self.rows = rows;
        self.cols = cols;
    }

    // -- Scrolling ----------------------------------------------------------

    /// Scroll the text down one line (`Ctrl-E`), never past the last line.
    /// Returns `true` if the offset changed.
    pub fn scroll_line_down(&mut self, doc: &Document) -> bool {
        if self.row_offset + 1 < doc.count() {
            self.row_offset += 1;
            true
        } else {
            false
        }
    }

    /// Scroll the text up one line (`Ctrl-Y`). Returns `true` if the offset
    /// changed.
    pub const fn scroll_line_up(&mut self) -> bool {
        if self.row_offset > 0 {
            self.row_offset -= 1;
            true
        } else {
            false
        }
    }

    /// Scroll the text left one column (`Ctrl-L`) while the cursor line
    /// still has text past the new left edge. Returns `true` if the offset
    /// changed.
    pub fn scroll_col_right(&mut self, doc: &Document, row: usize, tab_stop: usize) -> bool {
        let width = doc
            .line(row)
            .map_or(0, |line| cx2rx(line.len(), line, tab_stop));
        if self.col_offset + 1 < width {
            self.col_offset += 1;
            true
        } else {
            false
        }
    }

    /// Move the cursor along its line until its rendered column is inside
    /// `[col_offset, col_offset + cols)`, or it runs out of line.
    pub fn drag_cursor_col(&self, cursor: &mut Cursor, doc: &Document, tab_stop: usize) {
        let Some(line) = doc.line(cursor.row) else {
            return;
        };
        let last = line.len().saturating_sub(1);
        while cursor.col < last && cx2rx(cursor.col, line, tab_stop) < self.col_offset {
            cursor.col += 1;
        }
        let right = self.col_offset + self.cols.max(1);
        while cursor.col > 0 && cx2rx(cursor.col, line, tab_stop) >= right {
            cursor.col -= 1;
        }
        cursor.render_col = cx2rx(cursor.col, line, tab_stop);
    }

    /// Move the cursor the least amount needed to bring it back on screen
    /// after the offsets changed under it.
    pub fn drag_cursor(&self, cursor: &mut Cursor, doc: &Document, past_end: bool) {
        let top = self.row_offset;
        let bottom = top + self.text_rows().max(1) - 1;
        if cursor.row < top {
            cursor.row = top;
        } else if cursor.row > bottom {
            cursor.row = bottom;
        }
        cursor.clamp(doc, past_end);
    }

    /// Refresh the cursor's rendered column and adjust the offsets by the
    /// minimum needed to keep it inside the text area. No re-centering.
    pub fn scroll(&mut self, cursor: &mut Cursor, doc: &Document, tab_stop: usize) {
        cursor.render_col = doc
            .line(cursor.row)
            .map_or(0, |line| cx2rx(cursor.col, line, tab_stop));

        let height = self.text_rows();
        if height > 0 {
            if cursor.row < self.row_offset {
                self.row_offset = cursor.row;
            }
            if cursor.row >= self.row_offset + height {
                self.row_offset = cursor.row + 1 - height;
            }
        }

        if self.cols > 0 {
            if cursor.render_col < self.col_offset {
                self.col_offset = cursor.render_col;
            }
            if cursor.render_col >= self.col_offset + self.cols {
                self.col_offset = cursor.render_col + 1 - self.cols;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
