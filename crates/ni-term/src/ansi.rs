// SPDX-License-Identifier: MIT
//
// ANSI escape sequence generation.
//
// Pure functions that write escape sequences to any `impl Write`. No state,
// no decisions about when to emit. The renderer decides what a frame looks
// like; this module only knows the byte-level encoding of the handful of
// VT100 commands ni needs.
//
// Each fixed sequence is also exported as a byte constant, for callers that
// assemble output with `ScreenBuffer::append` and want its `Overflow` error
// rather than an `io::Error`.
//
// All cursor positions are 0-indexed in our API and converted to 1-indexed
// for the terminal (ANSI standard uses 1-based coordinates).
use std::io::{self, Write};

// ─── Sequences ───────────────────────────────────────────────────────────────

pub const CURSOR_HOME: &[u8] = b"\x1b[H";
pub const CURSOR_FAR_CORNER: &[u8] = b"\x1b[999C\x1b[999B";
pub const REQUEST_CURSOR_POSITION: &[u8] = b"\x1b[6n";
pub const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
pub const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
pub const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
pub const ERASE_LINE: &[u8] = b"\x1b[K";
pub const REVERSE_VIDEO: &[u8] = b"\x1b[7m";
pub const RESET: &[u8] = b"\x1b[0m";

// ─── Cursor ──────────────────────────────────────────────────────────────────

/// The CUP (Cursor Position) sequence for `(x, y)`.
///
/// Our coordinates are 0-indexed; ANSI CUP is 1-indexed.
#[must_use]
pub fn cursor_position(x: usize, y: usize) -> String {
    format!("\x1b[{};{}H", y + 1, x + 1)
}

/// Move the cursor to the top-left corner (CUP with no parameters).
#[inline]
pub fn cursor_home(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_HOME)
}

/// Push the cursor as far right and down as the terminal allows.
///
/// Used with [`request_cursor_position`] to discover the window size on
/// terminals that don't answer `TIOCGWINSZ`.
#[inline]
pub fn cursor_to_far_corner(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_FAR_CORNER)
}

/// Ask the terminal to report the cursor position (DSR 6).
///
/// The reply arrives on stdin as `ESC [ rows ; cols R`.
#[inline]
pub fn request_cursor_position(w: &mut impl Write) -> io::Result<()> {
    w.write_all(REQUEST_CURSOR_POSITION)
}

/// Show the cursor (DECTCEM set).
#[inline]
pub fn cursor_show(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CURSOR_SHOW)
}

// ─── Screen ──────────────────────────────────────────────────────────────────

/// Clear the entire screen (ED 2).
#[inline]
pub fn clear_screen(w: &mut impl Write) -> io::Result<()> {
    w.write_all(CLEAR_SCREEN)
}

// ─── Attributes ──────────────────────────────────────────────────────────────

/// Reset all SGR attributes to terminal defaults (SGR 0).
#[inline]
pub fn reset(w: &mut impl Write) -> io::Result<()> {
    w.write_all(RESET)
}

// ─── Cursor position report ─────────────────────────────────────────────────

/// Parse a cursor position report (`ESC [ rows ; cols R`).
///
/// Returns `(rows, cols)` as reported by the terminal (1-indexed, which for
/// a cursor pushed to the far corner equals the window size).
#[must_use]
pub fn parse_cursor_report(report: &[u8]) -> Option<(usize, usize)> {
    let body = report.strip_prefix(b"\x1b[")?.strip_suffix(b"R")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    Some((rows.parse().ok()?, cols.parse().ok()?))
}

// ─── Tests ───────────────────────────────────────────────────────────────────
