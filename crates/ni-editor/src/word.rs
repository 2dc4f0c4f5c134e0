//! Word and character motions within a single line.
//!
//! Every motion is a pure function `(column, line) -> column`. Motions never
//! leave the line: they stop at its first or last byte. The same functions
//! drive plain movement (`w`, `b`, `e`, `ge`, `f`, `F`) and the ranges of
//! the operator chords (`dw`, `cb`, `df<ch>`, ...).
//!
//! | Function | Key | Lands on |
//! |----------|-----|----------|
//! | [`word_forward`] | `w` | first byte of the next word |
//! | [`word_end_forward`] | `e` | last byte of the current or next word |
//! | [`word_backward`] | `b` | first byte of the current or previous word |
//! | [`word_end_backward`] | `ge` | last byte of the previous word |
//! | [`find_char`] | `f` / `F` | next / previous occurrence of a byte |
//!
//! # Words
//!
//! A word is a run of ASCII letters and digits. Everything else, punctuation
//! and underscore included, separates words. Lines are raw bytes, so bytes
//! outside ASCII are separators too.

#[inline]
const fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric()
}

// ---------------------------------------------------------------------------
// Word motions
// ---------------------------------------------------------------------------

/// `w`: skip the rest of the current word, then the separators after it.
///
/// Stops at the last byte of the line when no further word starts.
#[must_use]
pub fn word_forward(col: usize, line: &[u8]) -> usize {
    let Some(last) = line.len().checked_sub(1) else {
        return col;
    };
    let mut x = col;
    if x >= last {
        return x;
    }
    while x < last && is_word(line[x]) {
        x += 1;
    }
    while x < last && !is_word(line[x]) {
        x += 1;
    }
    x
}

/// `e`: move to the last byte of the next word end strictly after `col`.
#[must_use]
pub fn word_end_forward(col: usize, line: &[u8]) -> usize {
    let Some(last) = line.len().checked_sub(1) else {
        return col;
    };
    let mut x = col;
    if x >= last {
        return x;
    }
    while x < last && !is_word(line[x + 1]) {
        x += 1;
    }
    while x < last && is_word(line[x + 1]) {
        x += 1;
    }
    x
}

/// `b`: move to the first byte of the word before `col`.
#[must_use]
pub fn word_backward(col: usize, line: &[u8]) -> usize {
    let mut x = col.min(line.len());
    if x == 0 {
        return 0;
    }
    while x > 0 && !is_word(line[x - 1]) {
        x -= 1;
    }
    while x > 0 && is_word(line[x - 1]) {
        x -= 1;
    }
    x
}

/// `ge`: move to the last byte of the previous word.
///
/// Leaves the current word first, then the separators before it.
#[must_use]
pub fn word_end_backward(col: usize, line: &[u8]) -> usize {
    if line.is_empty() {
        return col;
    }
    let mut x = col.min(line.len() - 1);
    while x > 0 && is_word(line[x]) {
        x -= 1;
    }
    while x > 0 && !is_word(line[x]) {
        x -= 1;
    }
    x
}

// ---------------------------------------------------------------------------
// Character search
// ---------------------------------------------------------------------------

/// Position of the nearest `c` strictly after (`forward`) or before `col`.
#[must_use]
pub fn locate_char(col: usize, line: &[u8], c: u8, forward: bool) -> Option<usize> {
    if forward {
        let start = col.checked_add(1)?;
        line.get(start..)?
            .iter()
            .position(|&b| b == c)
            .map(|i| start + i)
    } else {
        let end = col.min(line.len());
        line[..end].iter().rposition(|&b| b == c)
    }
}

/// `f` / `F`: like [`locate_char`], but stays on `col` when nothing matches.
#[must_use]
pub fn find_char(col: usize, line: &[u8], c: u8, forward: bool) -> usize {
    locate_char(col, line, c, forward).unwrap_or(col)
}

/// The last `f`/`F` search, replayed by `;` and `,`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Find {
    /// The byte searched for.
    pub c: u8,
    /// `true` for `f`, `false` for `F`.
    pub forward: bool,
}

impl Find {
    /// Replay the search from `col`. `same_direction` is `true` for `;` and
    /// `false` for `,`, which searches the opposite way.
    #[must_use]
    pub fn repeat(self, col: usize, line: &[u8], same_direction: bool) -> usize {
        find_char(col, line, self.c, self.forward == same_direction)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
