//! Pending multi-key command.
//!
//! Normal-mode commands such as `dw`, `gg` or `dF<ch>` arrive one key at a
//! time. The [`Chord`] holds the keys seen so far (at most three) until the
//! command resolves or a key fails to continue it; either way it is cleared.
//! The status line shows the pending keys next to the mode name.

use std::fmt;

/// Longest chord: operator, sub-command, argument (`dge`, `df<ch>`).
pub const MAX_CHORD: usize = 3;

/// Up to [`MAX_CHORD`] pending key bytes.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Chord {
    keys: [u8; MAX_CHORD],
    len: usize,
}

impl Chord {
    /// An empty chord.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            keys: [0; MAX_CHORD],
            len: 0,
        }
    }

    /// Append a key. Returns `false` (and keeps the chord as is) when full.
    pub fn push(&mut self, key: u8) -> bool {
        if self.len == MAX_CHORD {
            return false;
        }
        self.keys[self.len] = key;
        self.len += 1;
        true
    }

    /// Drop all pending keys.
    #[inline]
    pub const fn clear(&mut self) {
        self.len = 0;
    }

    /// The pending keys, oldest first.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.keys[..self.len]
    }

    /// Number of pending keys.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// True when no command is pending.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in self.as_bytes() {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", char::from(b))?;
            } else {
                write!(f, "^{}", char::from(b ^ 0x40))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn starts_empty() {
        let chord = Chord::new();
        assert!(chord.is_empty());
        assert_eq!(chord.as_bytes(), b"");
    }

    #[test]
    fn push_up_to_three() {
        let mut chord = Chord::new();
        assert!(chord.push(b'd'));
        assert!(chord.push(b'f'));
        assert!(chord.push(b'x'));
        assert!(!chord.push(b'y'));
        assert_eq!(chord.as_bytes(), b"dfx");
        assert_eq!(chord.len(), 3);
    }

    #[test]
    fn clear_empties() {
        let mut chord = Chord::new();
        chord.push(b'g');
        chord.clear();
        assert!(chord.is_empty());
    }

    #[test]
    fn display_shows_pending_keys() {
        let mut chord = Chord::new();
        chord.push(b'c');
        chord.push(b'g');
        assert_eq!(chord.to_string(), "cg");
    }

    #[test]
    fn display_escapes_control_bytes() {
        let mut chord = Chord::new();
        chord.push(b'f');
        chord.push(b'\t');
        assert_eq!(chord.to_string(), "f^I");
    }
}
