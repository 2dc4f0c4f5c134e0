//! Error types for the editor core.
//!
//! None of these are fatal. Capacity errors abort the edit that hit them
//! and become a status message; render errors are logged and the frame is
//! still written.

use thiserror::Error;

use ni_term::output::Overflow;

/// An edit that could not be applied. The document is left unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EditError {
    /// Every line-storage slot is in use.
    #[error("Maximum number of lines reached.")]
    LinesExhausted,

    /// The result would not fit in one line-storage slot.
    #[error("Line too long (maximum {max} bytes).")]
    LineTooLong {
        /// Per-line byte capacity.
        max: usize,
    },
}

/// A frame that could not be drawn completely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RenderError {
    /// Mode, filename and cursor fields don't fit the terminal width.
    #[error("status line needs {needed} columns, terminal has {width}")]
    StatusTooLong {
        /// Columns the three fields need without padding.
        needed: usize,
        /// Terminal width.
        width: usize,
    },

    /// The frame did not fit into the screen buffer.
    #[error(transparent)]
    Screen(#[from] Overflow),
}
