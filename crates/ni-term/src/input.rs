// SPDX-License-Identifier: MIT
//
// Key decoding.
//
// Turns raw stdin bytes into logical keys. The terminal speaks a tiny
// subset of VT100 as far as ni is concerned:
//
// - Plain bytes map to themselves (control chords like Ctrl-S arrive as
//   their control code, `b's' & 0x1f`).
// - CR is Return; BS and DEL are both Delete (backspace).
// - `ESC [ A..D` are the arrow keys.
// - `ESC [ 3 ~`, `ESC [ 5 ~`, `ESC [ 6 ~` are Delete, PageUp, PageDown.
// - Anything else that starts with ESC resolves to a plain Escape.
//
// # Escape vs escape-sequence ambiguity
//
// A bare ESC byte could be the Escape key or the start of a sequence. The
// decoder switches the source to non-blocking reads while it looks for the
// continuation bytes, so a lone Escape press resolves immediately instead
// of hanging until the next keystroke. Blocking reads are restored on every
// path out of the sub-decoder.

use std::io;

const ESC: u8 = 0x1b;
const CR: u8 = 13;
const BS: u8 = 8;
const DEL: u8 = 127;

// ─── Key ─────────────────────────────────────────────────────────────────────

/// A decoded logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A plain byte: printable ASCII, tab, or a control code.
    Char(u8),
    Return,
    /// Backspace or the Delete key.
    Delete,
    Escape,
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    /// Nothing was read (the blocking read was interrupted, e.g. by a
    /// resize signal). Callers treat it as "loop again".
    Noop,
}

impl Key {
    /// The key produced by holding Ctrl with `byte` (masks the upper three
    /// bits, so `Key::ctrl(b'q')` is `Key::Char(0x11)`).
    #[inline]
    #[must_use]
    pub const fn ctrl(byte: u8) -> Self {
        Self::Char(byte & 0x1f)
    }
}

/// Printable ASCII (`0x20..=0x7e`) or a tab.
#[inline]
#[must_use]
pub const fn is_text_byte(b: u8) -> bool {
    matches!(b, b' '..=b'~' | b'\t')
}

// ─── ByteSource ──────────────────────────────────────────────────────────────

/// Where the decoder gets its bytes from.
///
/// The real implementation is [`Terminal`](crate::terminal::Terminal); tests
/// use a scripted source.
pub trait ByteSource {
    /// Read one byte. `Ok(None)` means no byte was available: either the
    /// source is in non-blocking mode and nothing is pending, or a blocking
    /// read was interrupted.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails.
    fn read_byte(&mut self) -> io::Result<Option<u8>>;

    /// Switch between blocking (wait for at least one byte) and immediate
    /// (return whatever is pending, possibly nothing) reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the mode switch fails.
    fn set_blocking(&mut self, blocking: bool) -> io::Result<()>;
}

// ─── Decoder ─────────────────────────────────────────────────────────────────

/// Read and decode one key from `src`.
///
/// # Errors
///
/// Returns an error if reading from the source or switching its blocking
/// mode fails.
pub fn read_key(src: &mut impl ByteSource) -> io::Result<Key> {
    let Some(byte) = src.read_byte()? else {
        return Ok(Key::Noop);
    };

    Ok(match byte {
        CR => Key::Return,
        BS | DEL => Key::Delete,
        ESC => read_escape_sequence(src)?,
        b => Key::Char(b),
    })
}

/// Decode the bytes following an ESC.
///
/// Runs with the source in non-blocking mode and always restores blocking
/// mode before returning, including when a read fails.
fn read_escape_sequence(src: &mut impl ByteSource) -> io::Result<Key> {
    src.set_blocking(false)?;
    let decoded = decode_continuation(src);
    src.set_blocking(true)?;
    let key = decoded?;
    tracing::trace!(?key, "escape sequence decoded");
    Ok(key)
}

fn decode_continuation(src: &mut impl ByteSource) -> io::Result<Key> {
    let Some(first) = src.read_byte()? else {
        return Ok(Key::Escape);
    };
    let Some(second) = src.read_byte()? else {
        return Ok(Key::Escape);
    };
    if first != b'[' {
        return Ok(Key::Escape);
    }

    match second {
        b'A' => return Ok(Key::Up),
        b'B' => return Ok(Key::Down),
        b'C' => return Ok(Key::Right),
        b'D' => return Ok(Key::Left),
        _ => {}
    }

    if !second.is_ascii_digit() {
        return Ok(Key::Escape);
    }
    if src.read_byte()? != Some(b'~') {
        return Ok(Key::Escape);
    }

    Ok(match second {
        b'3' => Key::Delete,
        b'5' => Key::PageUp,
        b'6' => Key::PageDown,
        _ => Key::Escape,
    })
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::VecDeque;

    /// Scripted byte source. Bytes are delivered in order; once exhausted
    /// every read yields `None`. Records every blocking-mode switch.
    struct Script {
        bytes: VecDeque<u8>,
        blocking: bool,
        switches: Vec<bool>,
        fail_reads: bool,
    }

    impl Script {
        fn new(bytes: &[u8]) -> Self {
            Self {
                bytes: bytes.iter().copied().collect(),
                blocking: true,
                switches: Vec::new(),
                fail_reads: false,
            }
        }
    }

    impl ByteSource for Script {
        fn read_byte(&mut self) -> io::Result<Option<u8>> {
            if self.fail_reads && !self.blocking {
                return Err(io::Error::other("boom"));
            }
            Ok(self.bytes.pop_front())
        }

        fn set_blocking(&mut self, blocking: bool) -> io::Result<()> {
            self.blocking = blocking;
            self.switches.push(blocking);
            Ok(())
        }
    }

    fn decode(bytes: &[u8]) -> Key {
        read_key(&mut Script::new(bytes)).unwrap()
    }

    // ── Plain bytes ──────────────────────────────────────────────────────

    #[test]
    fn printable_maps_to_itself() {
        assert_eq!(decode(b"a"), Key::Char(b'a'));
        assert_eq!(decode(b"~"), Key::Char(b'~'));
        assert_eq!(decode(b"\t"), Key::Char(b'\t'));
    }

    #[test]
    fn control_codes_map_to_themselves() {
        assert_eq!(decode(&[0x13]), Key::ctrl(b's'));
        assert_eq!(decode(&[0x11]), Key::ctrl(b'q'));
    }

    #[test]
    fn return_and_delete() {
        assert_eq!(decode(&[13]), Key::Return);
        assert_eq!(decode(&[8]), Key::Delete);
        assert_eq!(decode(&[127]), Key::Delete);
    }

    #[test]
    fn empty_read_is_noop() {
        assert_eq!(decode(b""), Key::Noop);
    }

    // ── Escape sequences ─────────────────────────────────────────────────

    #[test]
    fn arrows() {
        assert_eq!(decode(b"\x1b[A"), Key::Up);
        assert_eq!(decode(b"\x1b[B"), Key::Down);
        assert_eq!(decode(b"\x1b[C"), Key::Right);
        assert_eq!(decode(b"\x1b[D"), Key::Left);
    }

    #[test]
    fn tilde_sequences() {
        assert_eq!(decode(b"\x1b[3~"), Key::Delete);
        assert_eq!(decode(b"\x1b[5~"), Key::PageUp);
        assert_eq!(decode(b"\x1b[6~"), Key::PageDown);
    }

    #[test]
    fn lone_escape() {
        assert_eq!(decode(b"\x1b"), Key::Escape);
    }

    #[test]
    fn malformed_sequences_resolve_to_escape() {
        assert_eq!(decode(b"\x1b["), Key::Escape);
        assert_eq!(decode(b"\x1bOA"), Key::Escape);
        assert_eq!(decode(b"\x1b[Z"), Key::Escape);
        assert_eq!(decode(b"\x1b[3"), Key::Escape);
        assert_eq!(decode(b"\x1b[3x"), Key::Escape);
        assert_eq!(decode(b"\x1b[9~"), Key::Escape);
    }

    #[test]
    fn escape_toggles_blocking_and_restores() {
        let mut src = Script::new(b"\x1b[A");
        read_key(&mut src).unwrap();
        assert_eq!(src.switches, vec![false, true]);
        assert!(src.blocking);
    }

    #[test]
    fn lone_escape_restores_blocking() {
        let mut src = Script::new(b"\x1b");
        read_key(&mut src).unwrap();
        assert!(src.blocking);
    }

    #[test]
    fn failed_continuation_still_restores_blocking() {
        let mut src = Script::new(b"\x1b[A");
        src.fail_reads = true;
        assert!(read_key(&mut src).is_err());
        assert!(src.blocking);
    }

    #[test]
    fn plain_byte_never_switches_mode() {
        let mut src = Script::new(b"x");
        read_key(&mut src).unwrap();
        assert!(src.switches.is_empty());
    }

    #[test]
    fn leftover_bytes_stay_for_next_key() {
        let mut src = Script::new(b"\x1b[Aj");
        assert_eq!(read_key(&mut src).unwrap(), Key::Up);
        assert_eq!(read_key(&mut src).unwrap(), Key::Char(b'j'));
    }

    // ── Key helpers ──────────────────────────────────────────────────────

    #[test]
    fn ctrl_masks_upper_bits() {
        assert_eq!(Key::ctrl(b'q'), Key::Char(0x11));
        assert_eq!(Key::ctrl(b'Q'), Key::Char(0x11));
    }

    #[test]
    fn text_classification() {
        assert!(is_text_byte(b'a'));
        assert!(is_text_byte(b' '));
        assert!(is_text_byte(b'\t'));
        assert!(!is_text_byte(0x13));
        assert!(!is_text_byte(0x7f));
        assert!(!is_text_byte(0xc3));
    }
}
