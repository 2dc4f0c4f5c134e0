// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// SIGWINCH: terminal resize notification.
//
// The signal handler only sets an `AtomicBool`. Writing to an atomic is
// async-signal-safe; re-reading the window size and redrawing are not, so
// those happen in the main loop, which checks the flag once per iteration
// via [`take_pending`].
//
// The handler is installed *without* `SA_RESTART`: a blocking `read()` on
// stdin returns `EINTR` when the signal lands, the key decoder turns that
// into `Key::Noop`, and the loop gets a chance to redraw immediately
// instead of after the next keystroke.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag set by the SIGWINCH handler.
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// Install the SIGWINCH handler.
///
/// # Errors
///
/// Returns an error if `sigaction` fails.
#[cfg(unix)]
pub fn install_handler() -> std::io::Result<()> {
    unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = 0;
        libc::sigemptyset(&raw mut sa.sa_mask);
        if libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut()) != 0 {
            return Err(std::io::Error::last_os_error());
        }
    }
    tracing::debug!("SIGWINCH handler installed");
    Ok(())
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
pub fn install_handler() -> std::io::Result<()> {
    Ok(())
}

/// Mark a resize as pending. The signal handler's only job; exposed so
/// the flag can be driven without a real signal.
pub fn notify() {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

/// Consume the pending-resize flag. Returns `true` at most once per resize.
#[must_use]
pub fn take_pending() -> bool {
    RESIZE_PENDING.swap(false, Ordering::Relaxed)
}

// ─── Tests ───────────────────────────────────────────────────────────────────
