//! Capacities and rendering constants.
//!
//! Everything in the editor is bounded: the number of lines, the bytes per
//! line, the rendered width of a line, the size of a frame. [`Config`]
//! gathers those bounds in one value that is fixed when the editor is
//! created. There is no runtime option setting; the defaults are what the
//! binary uses, and tests build smaller configs (a two-line pool, say) to
//! reach the limits quickly.

/// Editor version shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Screen rows reserved below the text area (status line + message line).
pub const UTIL_LINES: usize = 2;

/// Bounds and constants for one editor instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Rendered columns per tab stop.
    pub tab_stop: usize,

    /// Bytes drawn for a tab: the first byte marks the tab, the second
    /// fills the rest of the gap up to the next tab stop.
    pub tab_chars: [u8; 2],

    /// Number of line-storage slots in the arena (the maximum line count).
    pub max_lines: usize,

    /// Bytes per line-storage slot (the maximum line length).
    pub max_line_len: usize,

    /// Size of the per-line render buffer (maximum rendered line width).
    pub max_render: usize,

    /// Size of the frame output buffer.
    pub max_screen: usize,

    /// Maximum status message length in bytes.
    pub max_message: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_stop: 8,
            tab_chars: [b'>', b'-'],
            max_lines: 4096,
            max_line_len: 4096,
            max_render: 1024,
            max_screen: 1 << 16,
            max_message: 256,
        }
    }
}

impl Config {
    /// Default config with a different line pool size.
    #[must_use]
    pub fn with_max_lines(max_lines: usize) -> Self {
        Self {
            max_lines,
            ..Self::default()
        }
    }

    /// Default config with a different per-line capacity.
    #[must_use]
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            max_line_len,
            ..Self::default()
        }
    }
}
