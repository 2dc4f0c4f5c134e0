// SPDX-License-Identifier: MIT
//
// ni-term: Terminal layer for ni.
//
// The OS-facing half of the editor, kept thin on purpose: raw mode and
// its restoration, switching reads between blocking and immediate, window
// size queries, resize notification, decoding stdin bytes into logical
// keys, and a bounded buffer that collects a whole frame of ANSI output
// for a single write.
//
// No TUI framework sits underneath. Escape sequences are emitted directly
// and termios is driven through libc.

pub mod ansi;
pub mod input;
pub mod output;
pub mod resize;
pub mod terminal;
