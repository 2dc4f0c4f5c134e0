// SPDX-License-Identifier: MIT
//
// Terminal control: raw mode, read blocking mode, window size, RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd reads/writes. These
// are the standard POSIX interfaces for terminal control. Each unsafe
// block is minimal.
#![allow(unsafe_code)]
//
// The `Terminal` owns the terminal's raw state. Entering raw mode disables
// echo, canonical line buffering, signal keys, flow control and output
// post-processing. Leaving restores the saved termios and clears the
// screen. Both happen at most once, and leaving also happens on drop and
// from the panic hook, so every exit path hands the user back a cooked
// terminal.
//
// Reads come in two flavours: blocking (VMIN=1, wait for a keystroke) and
// immediate (VMIN=0, return what is pending). The key decoder flips to
// immediate while it looks at an escape sequence.

use std::io::{self, Write};
use std::sync::{Mutex, Once};

use crate::ansi;
use crate::input::ByteSource;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns.
    pub cols: usize,
}

/// Fallback when the size can't be determined (tests, pipes).
pub const FALLBACK_SIZE: Size = Size { rows: 24, cols: 80 };

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal or the query fails.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size {
            rows: usize::from(ws.ws_row),
            cols: usize::from(ws.ws_col),
        })
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, original);
            }
        }
    }
}

/// Restore sequence for emergency use: reset attributes, show the cursor,
/// clear the screen and home the cursor.
const EMERGENCY_RESTORE: &[u8] = b"\x1b[0m\x1b[?25h\x1b[2J\x1b[H";

static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// Writes [`EMERGENCY_RESTORE`] straight to fd 1 (bypassing the stdout lock,
/// which may be held mid-frame), restores termios, then delegates to the
/// original hook so the message lands on a working terminal.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

fn emergency_restore() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(EMERGENCY_RESTORE);
        let _ = io::stdout().flush();
    }
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Terminal handle with RAII cleanup.
///
/// Call [`enter`](Self::enter) to switch to raw mode. The terminal is
/// restored when the handle is dropped, even on panic.
///
/// # Example
///
/// ```no_run
/// use ni_term::terminal::Terminal;
///
/// let mut term = Terminal::new();
/// term.enter()?;
/// // ... render frames, read keys ...
/// // Terminal is restored automatically on drop.
/// # Ok::<(), std::io::Error>(())
/// ```
pub struct Terminal {
    /// Original termios saved before entering raw mode.
    #[cfg(unix)]
    original: Option<libc::termios>,

    /// The raw-mode termios currently applied. VMIN is flipped on it when
    /// switching between blocking and immediate reads.
    #[cfg(unix)]
    raw: Option<libc::termios>,

    /// Whether we're in raw mode.
    active: bool,
}

impl Terminal {
    /// Create a terminal handle. Does **not** enter raw mode.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            #[cfg(unix)]
            original: None,
            #[cfg(unix)]
            raw: None,
            active: false,
        }
    }

    /// Whether we're currently in raw mode.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Determine the window size.
    ///
    /// Tries `TIOCGWINSZ` first. If that fails and we're in raw mode, pushes
    /// the cursor to the far corner and asks the terminal where it ended up.
    /// Falls back to [`FALLBACK_SIZE`] when neither works.
    pub fn size(&mut self) -> Size {
        if let Some(size) = get_size() {
            return size;
        }
        if self.active && is_tty() {
            if let Ok(Some(size)) = self.query_size_by_cursor() {
                return size;
            }
        }
        tracing::debug!("window size unavailable, using fallback");
        FALLBACK_SIZE
    }

    /// The cursor-position-report size probe.
    fn query_size_by_cursor(&mut self) -> io::Result<Option<Size>> {
        let mut out = io::stdout().lock();
        ansi::cursor_home(&mut out)?;
        ansi::cursor_to_far_corner(&mut out)?;
        ansi::request_cursor_position(&mut out)?;
        out.flush()?;
        drop(out);

        let mut report = [0u8; 32];
        let mut len = 0;
        while len < report.len() {
            let Some(b) = self.read_byte()? else {
                return Ok(None);
            };
            report[len] = b;
            len += 1;
            if b == b'R' {
                break;
            }
        }

        Ok(ansi::parse_cursor_report(&report[..len])
            .filter(|&(rows, cols)| rows > 0 && cols > 0)
            .map(|(rows, cols)| Size { rows, cols }))
    }

    /// Enter raw mode.
    ///
    /// Installs the panic hook (once per process). A no-op when stdin is
    /// not a terminal, and idempotent while already active.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or applying termios fails.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }

        install_panic_hook();
        self.enable_raw_mode()?;
        self.active = true;
        tracing::debug!("terminal entered raw mode");
        Ok(())
    }

    /// Leave raw mode: clear the screen, show the cursor and restore the
    /// original termios. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal output or the termios restore fails.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        ansi::reset(&mut lock)?;
        ansi::cursor_show(&mut lock)?;
        ansi::clear_screen(&mut lock)?;
        ansi::cursor_home(&mut lock)?;
        lock.flush()?;
        drop(lock);

        self.disable_raw_mode()?;
        self.active = false;
        tracing::debug!("terminal restored");
        Ok(())
    }

    // ── Raw Mode (termios) ──────────────────────────────────────────

    #[cfg(unix)]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        if !is_tty() {
            return Ok(());
        }

        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(libc::STDIN_FILENO, &raw mut termios) != 0 {
                return Err(io::Error::last_os_error());
            }

            self.original = Some(termios);
            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = Some(termios);
            }

            termios.c_iflag &=
                !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_cflag |= libc::CS8;
            termios.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);

            // VMIN=1, VTIME=0: read() blocks until at least 1 byte is available.
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, &raw const termios) != 0 {
                return Err(io::Error::last_os_error());
            }
            self.raw = Some(termios);
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn enable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }

    #[cfg(unix)]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        if let Some(ref original) = self.original {
            unsafe {
                if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original) != 0 {
                    return Err(io::Error::last_os_error());
                }
            }

            if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
                *guard = None;
            }

            self.original = None;
            self.raw = None;
        }

        Ok(())
    }

    #[cfg(not(unix))]
    fn disable_raw_mode(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.active {
            let _ = self.leave();
        }
    }
}

// ─── Byte input ─────────────────────────────────────────────────────────────

#[cfg(unix)]
impl ByteSource for Terminal {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut byte = 0u8;
        let n = unsafe { libc::read(libc::STDIN_FILENO, (&raw mut byte).cast(), 1) };

        match n {
            1 => Ok(Some(byte)),
            0 => Ok(None),
            _ => {
                let err = io::Error::last_os_error();
                match err.kind() {
                    // A signal (resize) interrupted the wait; EAGAIN comes
                    // from immediate reads on some platforms.
                    io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(None),
                    _ => Err(err),
                }
            }
        }
    }

    fn set_blocking(&mut self, blocking: bool) -> io::Result<()> {
        let Some(ref mut termios) = self.raw else {
            // Not a TTY (or not in raw mode): nothing to switch.
            return Ok(());
        };

        termios.c_cc[libc::VMIN] = u8::from(blocking);
        termios.c_cc[libc::VTIME] = 0;

        unsafe {
            if libc::tcsetattr(libc::STDIN_FILENO, libc::TCSANOW, &raw const *termios) != 0 {
                return Err(io::Error::last_os_error());
            }
        }
        Ok(())
    }
}

#[cfg(not(unix))]
impl ByteSource for Terminal {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut byte = [0u8; 1];
        match io::stdin().lock().read(&mut byte)? {
            0 => Ok(None),
            _ => Ok(Some(byte[0])),
        }
    }

    fn set_blocking(&mut self, _blocking: bool) -> io::Result<()> {
        Ok(())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_size_does_not_panic() {
        let _ = get_size();
    }

    #[test]
    fn is_tty_does_not_panic() {
        let _ = is_tty();
    }

    #[test]
    fn emergency_restore_shows_cursor_and_clears() {
        let s = std::str::from_utf8(EMERGENCY_RESTORE).unwrap();
        assert!(s.contains("\x1b[?25h"), "must show cursor");
        assert!(s.contains("\x1b[0m"), "must reset SGR attributes");
        assert!(s.ends_with("\x1b[2J\x1b[H"), "must clear and home last");
    }

    #[test]
    fn terminal_new_is_inactive() {
        let term = Terminal::new();
        assert!(!term.is_active());
    }

    #[test]
    fn terminal_size_is_never_zero() {
        let mut term = Terminal::new();
        let s = term.size();
        assert!(s.rows > 0);
        assert!(s.cols > 0);
    }

    #[test]
    fn terminal_leave_without_enter() {
        let mut term = Terminal::new();
        term.leave().unwrap();
        assert!(!term.is_active());
    }

    #[test]
    fn set_blocking_without_raw_mode_is_noop() {
        let mut term = Terminal::new();
        term.set_blocking(false).unwrap();
        term.set_blocking(true).unwrap();
    }

    #[test]
    fn fallback_size_is_classic_vt100() {
        assert_eq!(FALLBACK_SIZE, Size { rows: 24, cols: 80 });
    }
}
