//! Modal editing state.
//!
//! The editor is always in exactly one [`Mode`]:
//!
//! | Mode   | Cursor limit          | Keys are           |
//! |--------|-----------------------|--------------------|
//! | Normal | `0..len-1` (0 if empty) | commands and chords |
//! | Insert | `0..len`              | text               |
//!
//! A pending chord (`d`, `cg`, `f`, ...) is not a mode of its own: it is
//! Normal mode with a non-empty [`Chord`](crate::chord::Chord).

use std::fmt;

/// The current editing mode.
///
/// Pure data. Key dispatch and mode transitions live in
/// [`Editor`](crate::editor::Editor).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Keys are commands, not text input.
    #[default]
    Normal,
    /// Keys produce bytes in the document.
    Insert,
}

impl Mode {
    /// Human-readable name for the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Insert => "INSERT",
        }
    }

    /// True if the cursor can sit one past the last byte of the line.
    #[inline]
    #[must_use]
    pub const fn cursor_past_end(self) -> bool {
        matches!(self, Self::Insert)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names() {
        assert_eq!(Mode::Normal.display_name(), "NORMAL");
        assert_eq!(Mode::Insert.display_name(), "INSERT");
        assert_eq!(format!("{}", Mode::Insert), "INSERT");
    }

    #[test]
    fn only_insert_goes_past_end() {
        assert!(Mode::Insert.cursor_past_end());
        assert!(!Mode::Normal.cursor_past_end());
    }

    #[test]
    fn default_is_normal() {
        assert_eq!(Mode::default(), Mode::Normal);
    }
}
