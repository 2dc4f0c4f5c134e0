//! Editor: the modal command interpreter.
//!
//! An [`Editor`] owns everything one editing session needs: the document,
//! cursor, viewport, mode, pending chord, last character search and status
//! message. The driver feeds it decoded keys through
//! [`process_key`](Editor::process_key); the renderer reads it back each
//! frame.
//!
//! # Dispatch
//!
//! ```text
//!            ┌── chord empty ──▶ single-key command / chord starter
//!  Normal ───┤
//!            └── chord pending ─▶ extend chord ─▶ resolve | wait | discard
//!
//!  Insert ───▶ text, Delete, Return, arrows, Esc / Ctrl-Q
//! ```
//!
//! After every Normal-mode key that leaves the editor in Normal mode the
//! cursor is normalized, so a `$` or `d$` never leaves it past the line end.
//!
//! # Side effects
//!
//! The editor never touches the terminal or the file system. Quitting and
//! saving are requests the driver picks up: [`quit_request`] and
//! [`save_requested`].
//!
//! [`quit_request`]: Editor::quit_request
//! [`save_requested`]: Editor::save_requested

use std::fmt;

use ni_term::input::{Key, is_text_byte};

use crate::chord::Chord;
use crate::config::Config;
use crate::cursor::{Cursor, Direction, Viewport};
use crate::document::Document;
use crate::error::EditError;
use crate::mode::Mode;
use crate::word::{self, Find};

/// Control-key bytes, as [`Key::ctrl`] produces them.
const CTRL_D: u8 = b'd' & 0x1f;
const CTRL_E: u8 = b'e' & 0x1f;
const CTRL_G: u8 = b'g' & 0x1f;
const CTRL_L: u8 = b'l' & 0x1f;
const CTRL_Q: u8 = b'q' & 0x1f;
const CTRL_S: u8 = b's' & 0x1f;
const CTRL_U: u8 = b'u' & 0x1f;
const CTRL_Y: u8 = b'y' & 0x1f;

/// Shown in place of a file name for unnamed documents.
pub const NO_NAME: &str = "[NO NAME]";

// ---------------------------------------------------------------------------
// QuitRequest
// ---------------------------------------------------------------------------

/// The editor wants the session to end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuitRequest {
    /// Process exit status.
    pub status: u8,
    /// Error to report once the terminal is restored.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// One editing session.
pub struct Editor {
    config: Config,
    doc: Document,
    cursor: Cursor,
    viewport: Viewport,
    mode: Mode,
    chord: Chord,
    find: Option<Find>,
    message: String,
    quit: Option<QuitRequest>,
    save: bool,
}

impl Editor {
    // -- Construction -------------------------------------------------------

    /// An editor with the default [`Config`] on a `rows` x `cols` screen.
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_config(Config::default(), rows, cols)
    }

    /// An editor with explicit bounds.
    #[must_use]
    pub fn with_config(config: Config, rows: usize, cols: usize) -> Self {
        let doc = Document::new(config.max_lines, config.max_line_len);
        let message = String::with_capacity(config.max_message);
        Self {
            config,
            doc,
            cursor: Cursor::new(),
            viewport: Viewport::new(rows, cols),
            mode: Mode::Normal,
            chord: Chord::new(),
            find: None,
            message,
            quit: None,
            save: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.doc
    }

    /// Mutable document access for the file loader.
    #[inline]
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    #[inline]
    #[must_use]
    pub const fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> Mode {
        self.mode
    }

    /// Keys of the command still being typed.
    #[inline]
    #[must_use]
    pub const fn chord(&self) -> &Chord {
        &self.chord
    }

    /// The last `f`/`F` search.
    #[inline]
    #[must_use]
    pub const fn last_find(&self) -> Option<Find> {
        self.find
    }

    /// The current status message.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Pending quit, if any.
    #[inline]
    #[must_use]
    pub const fn quit_request(&self) -> Option<&QuitRequest> {
        self.quit.as_ref()
    }

    /// True when the document should be written out.
    #[inline]
    #[must_use]
    pub const fn save_requested(&self) -> bool {
        self.save
    }

    /// The file name to show: the document's, or [`NO_NAME`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.doc.filename().unwrap_or(NO_NAME)
    }

    // -- Driver hooks -------------------------------------------------------

    /// Read and reset the save request.
    pub const fn take_save_request(&mut self) -> bool {
        std::mem::replace(&mut self.save, false)
    }

    /// Ask the driver to end the session.
    pub fn request_quit(&mut self, status: u8, error: Option<String>) {
        tracing::debug!(status, ?error, "quit requested");
        self.quit = Some(QuitRequest { status, error });
    }

    /// Withdraw a pending quit (a save-and-quit whose save failed).
    pub fn cancel_quit(&mut self) {
        if self.quit.take().is_some() {
            tracing::debug!("quit cancelled");
        }
    }

    /// Replace the status message, truncated to the configured capacity.
    pub fn set_message(&mut self, message: impl fmt::Display) {
        use fmt::Write as _;

        self.message.clear();
        let _ = write!(self.message, "{message}");
        if self.message.len() > self.config.max_message {
            let mut end = self.config.max_message;
            while !self.message.is_char_boundary(end) {
                end -= 1;
            }
            self.message.truncate(end);
        }
    }

    /// Adopt a new terminal size.
    pub fn resize(&mut self, rows: usize, cols: usize) {
        tracing::debug!(rows, cols, "resize");
        self.viewport.resize(rows, cols);
    }

    /// Refresh the cursor's rendered column and scroll it into view.
    pub fn scroll(&mut self) {
        self.viewport
            .scroll(&mut self.cursor, &self.doc, self.config.tab_stop);
    }

    // -- Key dispatch -------------------------------------------------------

    /// Interpret one key.
    pub fn process_key(&mut self, key: Key) {
        if key == Key::Noop {
            return;
        }
        match self.mode {
            Mode::Normal => {
                if self.chord.is_empty() {
                    self.normal_key(key);
                } else {
                    self.chord_key(key);
                }
                if self.mode == Mode::Normal {
                    self.cursor.normalize(&self.doc);
                }
            }
            Mode::Insert => self.insert_key(key),
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode != mode {
            tracing::debug!(from = %self.mode, to = %mode, "mode change");
            self.mode = mode;
        }
    }

    fn report(&mut self, err: EditError) {
        tracing::debug!(%err, "edit refused");
        self.set_message(err);
    }

    /// Bytes of the cursor line (empty when the document is).
    fn current_line(&self) -> &[u8] {
        self.doc.line(self.cursor.row()).unwrap_or_default()
    }

    // -- Normal mode --------------------------------------------------------

    fn normal_key(&mut self, key: Key) {
        let c = match key {
            Key::Char(c) => c,
            Key::Up => return self.step(Direction::Up),
            Key::Down => return self.step(Direction::Down),
            Key::Left | Key::Delete => return self.step(Direction::Left),
            Key::Right => return self.step(Direction::Right),
            Key::PageDown => return self.page_down(self.viewport.text_rows()),
            Key::PageUp => return self.page_up(self.viewport.text_rows()),
            Key::Return | Key::Escape | Key::Noop => return,
        };

        match c {
            b'q' => self.request_quit(0, None),
            CTRL_Q => self.request_quit(1, None),
            CTRL_S => self.save = true,
            CTRL_G => self.show_file_info(),

            b'i' | b'a' | b'A' | b'I' => self.enter_insert(c),

            b'h' => self.step(Direction::Left),
            b'j' => self.step(Direction::Down),
            b'k' => self.step(Direction::Up),
            b'l' => self.step(Direction::Right),

            CTRL_E => {
                self.viewport.scroll_line_down(&self.doc);
                self.viewport.drag_cursor(&mut self.cursor, &self.doc, false);
            }
            CTRL_Y => {
                self.viewport.scroll_line_up();
                self.viewport.drag_cursor(&mut self.cursor, &self.doc, false);
            }
            CTRL_L => {
                let (row, tab_stop) = (self.cursor.row(), self.config.tab_stop);
                self.viewport.scroll_col_right(&self.doc, row, tab_stop);
                self.viewport.drag_cursor_col(&mut self.cursor, &self.doc, tab_stop);
            }
            CTRL_D => self.page_down(self.viewport.text_rows() / 2),
            CTRL_U => self.page_up(self.viewport.text_rows() / 2),

            b'0' => self.cursor.set_col(0),
            b'$' => self.cursor.set_col(self.current_line().len().saturating_sub(1)),
            b'w' => self.motion(word::word_forward),
            b'b' => self.motion(word::word_backward),
            b'e' => self.motion(word::word_end_forward),
            b'G' => self.cursor.set_row(self.doc.count().saturating_sub(1)),

            b'O' => self.open_line(self.cursor.row()),
            b'o' => {
                let at = if self.doc.is_empty() { 0 } else { self.cursor.row() + 1 };
                self.open_line(at);
            }

            b'J' => {
                if let Err(err) = self.doc.join_lines(self.cursor.row()) {
                    self.report(err);
                }
            }
            b'x' => self.doc.delete_chars(self.cursor.row(), self.cursor.col(), 1),
            b'D' => self.doc.crop_line(self.cursor.row(), self.cursor.col()),
            b'C' => {
                self.doc.crop_line(self.cursor.row(), self.cursor.col());
                self.enter_insert(b'i');
            }

            b';' | b',' => {
                if let Some(find) = self.find {
                    let col = find.repeat(self.cursor.col(), self.current_line(), c == b';');
                    self.cursor.set_col(col);
                }
            }

            b'd' | b'c' | b'f' | b'F' | b'g' | b'Z' => {
                self.chord.push(c);
            }

            _ => {}
        }
    }

    fn step(&mut self, dir: Direction) {
        let past_end = self.mode.cursor_past_end();
        self.cursor.step(dir, &self.doc, past_end);
    }

    fn page_down(&mut self, rows: usize) {
        self.cursor.move_down(rows.max(1), &self.doc, false);
    }

    fn page_up(&mut self, rows: usize) {
        self.cursor.move_up(rows.max(1), &self.doc, false);
    }

    fn motion(&mut self, motion: fn(usize, &[u8]) -> usize) {
        let col = motion(self.cursor.col(), self.current_line());
        self.cursor.set_col(col);
    }

    /// `i a A I`: switch to Insert mode, creating the first line of an
    /// empty document.
    fn enter_insert(&mut self, how: u8) {
        if self.doc.is_empty() {
            if let Err(err) = self.doc.insert_line(0) {
                return self.report(err);
            }
        }

        let len = self.current_line().len();
        match how {
            b'a' if len > 0 => self.cursor.set_col(self.cursor.col() + 1),
            b'A' => self.cursor.set_col(len),
            b'I' => self.cursor.set_col(0),
            _ => {}
        }
        self.cursor.clamp(&self.doc, true);
        self.set_mode(Mode::Insert);
    }

    /// `o O`: insert an empty line at `at`, put the cursor on it and enter
    /// Insert mode.
    fn open_line(&mut self, at: usize) {
        match self.doc.insert_line(at) {
            Ok(row) => {
                self.cursor.set_row(row);
                self.cursor.set_col(0);
                self.set_mode(Mode::Insert);
            }
            Err(err) => self.report(err),
        }
    }

    fn show_file_info(&mut self) {
        let count = self.doc.count();
        let info = if count > 0 {
            let percent = ((self.cursor.row() + 1) * 100 + count / 2) / count;
            format!("\"{}\" {count} lines, --{percent}%--", self.display_name())
        } else {
            format!("\"{}\" --No lines in buffer--", self.display_name())
        };
        self.set_message(info);
    }

    // -- Chords -------------------------------------------------------------

    /// Extend the pending chord with `key` and act on it.
    ///
    /// Leaves the chord in place when it is a valid prefix, clears it
    /// otherwise.
    fn chord_key(&mut self, key: Key) {
        let Key::Char(c) = key else {
            self.chord.clear();
            return;
        };
        if !self.chord.push(c) {
            self.chord.clear();
            return;
        }

        let chord = self.chord;
        let keys = chord.as_bytes();
        tracing::trace!(chord = %chord, "chord");

        match *keys {
            [b'd' | b'c', b'g' | b'f' | b'F'] => return,

            [b'Z', b'Z'] => {
                self.save = true;
                self.request_quit(0, None);
            }
            [b'Z', b'Q'] => self.request_quit(1, None),

            [b'g', b'g'] => self.cursor.set_row(0),
            [b'g', b'e'] => self.motion(word::word_end_backward),

            [dir @ (b'f' | b'F'), ch] if is_text_byte(ch) => {
                let find = Find { c: ch, forward: dir == b'f' };
                self.find = Some(find);
                self.cursor
                    .set_col(word::find_char(self.cursor.col(), self.current_line(), ch, find.forward));
            }

            [b'd', b'd'] => self.doc.delete_line(self.cursor.row()),
            [b'c', b'c'] => {
                self.doc.crop_line(self.cursor.row(), 0);
                self.enter_insert(b'i');
            }

            [op @ (b'd' | b'c'), m] => {
                if let Some((from, to)) = self.operator_range(m) {
                    self.delete_range(op, from, to);
                }
            }
            [op @ (b'd' | b'c'), b'g', b'e'] => {
                let from = word::word_end_backward(self.cursor.col(), self.current_line());
                self.delete_range(op, from, self.cursor.col());
            }
            [op @ (b'd' | b'c'), dir @ (b'f' | b'F'), ch] if is_text_byte(ch) => {
                let forward = dir == b'f';
                self.find = Some(Find { c: ch, forward });
                let col = self.cursor.col();
                let hit = word::find_char(col, self.current_line(), ch, forward);
                if forward {
                    self.delete_range(op, col, hit + 1);
                } else {
                    self.delete_range(op, hit, col);
                }
            }

            _ => tracing::trace!(chord = %chord, "chord discarded"),
        }

        self.chord.clear();
    }

    /// The `[from, to)` byte range an operator covers for motion key `m`.
    fn operator_range(&self, m: u8) -> Option<(usize, usize)> {
        let col = self.cursor.col();
        let line = self.current_line();
        let range = match m {
            b'w' => (col, word::word_forward(col, line)),
            b'e' => (col, word::word_end_forward(col, line) + 1),
            b'b' => (word::word_backward(col, line), col),
            b'0' => (0, col),
            b'$' => (col, line.len()),
            _ => return None,
        };
        Some(range)
    }

    /// Delete `[from, to)` of the cursor line, leave the cursor on `from`,
    /// and enter Insert mode for the `c` operator.
    fn delete_range(&mut self, op: u8, from: usize, to: usize) {
        let row = self.cursor.row();
        self.doc.delete_chars(row, from, to.saturating_sub(from));
        self.cursor.set_col(from);
        if op == b'c' {
            self.enter_insert(b'i');
        }
    }

    // -- Insert mode --------------------------------------------------------

    fn insert_key(&mut self, key: Key) {
        match key {
            Key::Escape | Key::Char(CTRL_Q) => {
                self.set_mode(Mode::Normal);
                self.cursor.normalize(&self.doc);
            }
            Key::Delete => {
                let col = self.cursor.col();
                if col > 0 {
                    self.doc.delete_chars(self.cursor.row(), col - 1, 1);
                    self.cursor.set_col(col - 1);
                }
            }
            Key::Return => self.break_line(),
            Key::Up => self.step(Direction::Up),
            Key::Down => self.step(Direction::Down),
            Key::Left => self.step(Direction::Left),
            Key::Right => self.step(Direction::Right),
            Key::Char(c) if is_text_byte(c) => {
                let (row, col) = (self.cursor.row(), self.cursor.col());
                if self.doc.line_insert_char(row, col, c) {
                    self.cursor.set_col(col + 1);
                }
            }
            _ => {}
        }
    }

    /// Return in Insert mode: split at the cursor, or open an empty line
    /// below when the cursor is at the end of the line.
    fn break_line(&mut self) {
        let (row, col) = (self.cursor.row(), self.cursor.col());
        let result = if self.doc.is_empty() || col >= self.doc.line_len(row) {
            let below = if self.doc.is_empty() { 0 } else { row + 1 };
            self.doc.insert_line(below).map(|_| ())
        } else {
            self.doc.split_line(row, col).map(|_| ())
        };

        match result {
            Ok(()) => {
                let next = if self.doc.count() > row + 1 { row + 1 } else { row };
                self.cursor.set_row(next);
                self.cursor.set_col(0);
            }
            Err(err) => self.report(err),
        }
    }
}

impl fmt::Debug for Editor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Editor")
            .field("doc", &self.doc)
            .field("cursor", &self.cursor)
            .field("viewport", &self.viewport)
            .field("mode", &self.mode)
            .field("chord", &self.chord)
            .field("quit", &self.quit)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
