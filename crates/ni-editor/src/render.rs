//! Renderer: the bridge from editor state to terminal bytes.
//!
//! Each frame is assembled from scratch into one bounded
//! [`ScreenBuffer`] and written by the driver in a single call:
//!
//! ```text
//! Editor                 Renderer                 ScreenBuffer
//! ┌──────────┐   ┌───────────────────────┐   ┌──────────────────┐
//! │ document │   │ tab expansion         │   │ hide, home       │
//! │ cursor   │──▶│ viewport clipping     │──▶│ text rows / ~    │
//! │ viewport │   │ status + message line │   │ status, message  │
//! │ message  │   │                       │   │ place, show      │
//! └──────────┘   └───────────────────────┘   └──────────────────┘
//! ```
//!
//! Screen layout for `rows` rows: text on rows `0..rows-2`, the status line
//! on row `rows-2`, the message line on row `rows-1`. Every row ends with
//! erase-to-end-of-line; rows are separated by CRLF.
//!
//! Nothing here ever emits more than `cols` visible columns on a row.

use std::time::Duration;

use ni_term::ansi;
use ni_term::output::ScreenBuffer;

use crate::config::{Config, VERSION};
use crate::editor::Editor;
use crate::error::RenderError;
use crate::mode::Mode;

/// Shown on the status row when the three fields don't fit.
const STATUS_TOO_LONG: &str = "!!! ERROR: Status too long !!!";

/// Visible width of the frame-time readout, ` NNNNNNNN us`.
pub const DURATION_WIDTH: usize = 12;

// ---------------------------------------------------------------------------
// Line rendering
// ---------------------------------------------------------------------------

/// Expand `line` into `dst` for display and return the rendered length.
///
/// A tab becomes `tab_chars[0]` followed by `tab_chars[1]` up to the next
/// multiple of `tab_stop`. Output stops at `max_render` bytes.
pub fn render_line(line: &[u8], config: &Config, dst: &mut Vec<u8>) -> usize {
    let tab_stop = config.tab_stop.max(1);
    let [tab_mark, tab_fill] = config.tab_chars;
    dst.clear();

    for &b in line {
        if dst.len() >= config.max_render {
            break;
        }
        if b == b'\t' {
            dst.push(tab_mark);
            while dst.len() % tab_stop != 0 && dst.len() < config.max_render {
                dst.push(tab_fill);
            }
        } else {
            dst.push(b);
        }
    }

    dst.len()
}

// ---------------------------------------------------------------------------
// Status and message lines
// ---------------------------------------------------------------------------

/// The three status fields: mode (+ pending chord), file, cursor.
fn status_fields(ed: &Editor) -> [String; 3] {
    let mut mode = format!(" --- {} --- ", ed.mode().display_name());
    if ed.mode() == Mode::Normal {
        mode.push_str(&ed.chord().to_string());
    }

    let dirty = if ed.document().is_dirty() { " [+]" } else { "" };
    let file = format!("{}{dirty}", ed.display_name());

    let cursor = format!("[{}:{}]", ed.cursor().row() + 1, ed.cursor().col() + 1);

    [mode, file, cursor]
}

/// Append the status line for a `width`-column screen.
///
/// The fields are spread across the row; the leftover width is split evenly
/// between the two gaps, the odd column going to the second one.
///
/// # Errors
///
/// [`RenderError::StatusTooLong`] when the fields don't fit (a truncated
/// error banner is drawn instead), or [`RenderError::Screen`] when the
/// frame buffer is full.
pub fn draw_status(
    screen: &mut ScreenBuffer,
    ed: &Editor,
    width: usize,
) -> Result<(), RenderError> {
    let fields = status_fields(ed);
    let needed: usize = fields.iter().map(String::len).sum();

    if needed > width {
        let banner = &STATUS_TOO_LONG.as_bytes()[..STATUS_TOO_LONG.len().min(width)];
        screen.append(banner)?;
        return Err(RenderError::StatusTooLong { needed, width });
    }

    let spare = width - needed;
    let gap = spare / 2;
    let [mode, file, cursor] = &fields;

    screen.append(ansi::REVERSE_VIDEO)?;
    screen.append(mode.as_bytes())?;
    screen.fill(b' ', gap)?;
    screen.append(file.as_bytes())?;
    screen.fill(b' ', spare - gap)?;
    screen.append(cursor.as_bytes())?;
    screen.append(ansi::RESET)?;
    Ok(())
}

/// Append the message line: the message (truncated), padding, and the
/// fixed-width frame-time readout at the right edge.
///
/// When the screen is narrower than the readout only the message is drawn.
///
/// # Errors
///
/// [`RenderError::Screen`] when the frame buffer is full.
pub fn draw_message(
    screen: &mut ScreenBuffer,
    message: &str,
    elapsed: Option<Duration>,
    width: usize,
) -> Result<(), RenderError> {
    let room = width.checked_sub(DURATION_WIDTH);
    let text = truncate(message, room.unwrap_or(width));
    screen.append(text.as_bytes())?;

    if let Some(room) = room {
        let micros = elapsed.map_or(0, |d| d.as_micros());
        screen.fill(b' ', room - text.len())?;
        screen.append(format!(" {micros:>8} us").as_bytes())?;
    }
    Ok(())
}

/// Longest prefix of `s` that is at most `max` bytes and ends on a char
/// boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Frame assembler. Owns the per-line render buffer and the frame buffer so
/// neither is reallocated between frames.
pub struct Renderer {
    line_buf: Vec<u8>,
    screen: ScreenBuffer,
}

impl Renderer {
    /// A renderer sized by `config` (`max_render`, `max_screen`).
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            line_buf: Vec::with_capacity(config.max_render),
            screen: ScreenBuffer::with_capacity(config.max_screen),
        }
    }

    /// Bytes of the last assembled frame.
    #[inline]
    #[must_use]
    pub fn output(&self) -> &[u8] {
        self.screen.as_bytes()
    }

    /// The frame buffer, for the driver's single write.
    #[inline]
    pub const fn screen_mut(&mut self) -> &mut ScreenBuffer {
        &mut self.screen
    }

    /// Assemble a full frame: scroll the viewport to the cursor, hide the
    /// cursor, draw every row, place and show the cursor.
    ///
    /// A status line that doesn't fit is reported after the rest of the
    /// frame has been drawn, so the frame is still usable.
    ///
    /// # Errors
    ///
    /// [`RenderError::Screen`] when the frame doesn't fit the screen buffer
    /// (the frame is cut short), or [`RenderError::StatusTooLong`].
    pub fn refresh(
        &mut self,
        ed: &mut Editor,
        elapsed: Option<Duration>,
    ) -> Result<(), RenderError> {
        ed.scroll();
        self.screen.clear();

        self.screen.append(ansi::CURSOR_HIDE)?;
        self.screen.append(ansi::CURSOR_HOME)?;
        let status = self.draw_rows(ed, elapsed)?;

        let view = ed.viewport();
        let x = ed.cursor().render_col().saturating_sub(view.col_offset());
        let y = ed.cursor().row().saturating_sub(view.row_offset());
        self.screen
            .append(ansi::cursor_position(x, y).as_bytes())?;
        self.screen.append(ansi::CURSOR_SHOW)?;

        status
    }

    /// Draw every screen row. The outer result carries buffer overflow; the
    /// inner one the (non-fatal) status line outcome.
    fn draw_rows(
        &mut self,
        ed: &Editor,
        elapsed: Option<Duration>,
    ) -> Result<Result<(), RenderError>, RenderError> {
        let view = ed.viewport();
        let rows = view.rows();
        let cols = view.cols();
        let doc = ed.document();
        let mut status = Ok(());

        for y in 0..rows {
            match rows - y {
                2 => match draw_status(&mut self.screen, ed, cols) {
                    Err(RenderError::Screen(overflow)) => return Err(overflow.into()),
                    other => status = other,
                },
                1 => draw_message(&mut self.screen, ed.message(), elapsed, cols)?,
                _ => {
                    let at = y + view.row_offset();
                    if let Some(line) = doc.line(at) {
                        self.draw_text(line, ed.config(), view.col_offset(), cols)?;
                    } else if doc.is_empty() && y == rows / 3 {
                        draw_welcome(&mut self.screen, cols)?;
                    } else {
                        self.screen.append(b"~")?;
                    }
                }
            }

            self.screen.append(ansi::ERASE_LINE)?;
            if y + 1 < rows {
                self.screen.append(b"\r\n")?;
            }
        }

        if let Err(err) = &status {
            tracing::warn!(%err, "status line not drawn");
        }
        Ok(status)
    }

    /// The visible slice `[col_offset, col_offset + cols)` of a rendered line.
    fn draw_text(
        &mut self,
        line: &[u8],
        config: &Config,
        col_offset: usize,
        cols: usize,
    ) -> Result<(), RenderError> {
        let len = render_line(line, config, &mut self.line_buf);
        if col_offset >= len {
            return Ok(());
        }
        let end = len.min(col_offset + cols);
        self.screen.append(&self.line_buf[col_offset..end])?;
        Ok(())
    }
}

/// `ni editor -- version X`, centered in `cols - 1` columns.
fn draw_welcome(screen: &mut ScreenBuffer, cols: usize) -> Result<(), RenderError> {
    let banner = format!("ni editor -- version {VERSION}");
    let width = cols.saturating_sub(1);
    let text = truncate(&banner, width);
    screen.fill(b' ', (width - text.len()) / 2)?;
    screen.append(text.as_bytes())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
