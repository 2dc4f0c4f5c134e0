// SPDX-License-Identifier: MIT
//
// ni: a small modal terminal text editor.
//
// This is the driver that wires the two crates together:
//
//   ni-term   → raw mode, key decoding, window size, resize flag
//   ni-editor → document, cursor, modal commands, frame assembly
//
// The loop is single-threaded and strictly sequential:
//
//   resize flag? → re-read size
//   render frame → one write to stdout
//   read key     → process_key → save / quit requests
//
// The core never touches the terminal or the file system. It records a
// save request and a quit request (exit status + optional error); the loop
// acts on them, restores the terminal, and only then reports errors.
//
// Logging goes to `ni.log` in the system temp directory, never to the
// terminal being drawn on, and only when `NI_LOG` holds a filter
// (`NI_LOG=debug ni file.txt`).

mod file;

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ni_editor::{Editor, Renderer};
use ni_term::input::{Key, read_key};
use ni_term::resize;
use ni_term::terminal::Terminal;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "NI_LOG";

/// Log file name, created in the system temp directory.
const LOG_FILE: &str = "ni.log";

// ─── CLI ────────────────────────────────────────────────────────────────────

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "ni", version, about = "A small modal terminal text editor")]
struct Args {
    /// File to edit. Created on first save if it doesn't exist.
    path: Option<PathBuf>,
}

// ─── Logging ────────────────────────────────────────────────────────────────

/// Install a file-backed subscriber when `NI_LOG` is set.
///
/// The returned guard flushes the non-blocking writer on drop and must live
/// until the end of `main`.
fn configure_logging() -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).ok()?;
    let appender = tracing_appender::rolling::never(std::env::temp_dir(), LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

// ─── Session ────────────────────────────────────────────────────────────────

/// Carry out a pending save. A failure becomes the status message and
/// withdraws a pending quit so `ZZ` never exits with unsaved changes.
fn handle_save(editor: &mut Editor) {
    if !editor.take_save_request() {
        return;
    }
    if let Err(err) = file::save(editor) {
        tracing::warn!(error = %format!("{err:#}"), "save failed");
        editor.set_message(format!("{err:#}"));
        editor.cancel_quit();
    }
}

/// Run one editing session in raw mode and return the exit status.
fn run(args: &Args) -> Result<u8> {
    let mut term = Terminal::new();
    term.enter().context("failed to enable raw mode")?;
    resize::install_handler().context("failed to install resize handler")?;

    let size = term.size();
    tracing::info!(rows = size.rows, cols = size.cols, "startup");
    let mut editor = Editor::new(size.rows, size.cols);
    if let Some(path) = &args.path {
        file::open(&mut editor, path)?;
    }

    let mut renderer = Renderer::new(editor.config());
    let mut stdout = io::stdout();
    let mut elapsed: Option<Duration> = None;
    let mut input_at: Option<Instant> = None;

    let quit = loop {
        if resize::take_pending() {
            let size = term.size();
            editor.resize(size.rows, size.cols);
        }

        if let Err(err) = renderer.refresh(&mut editor, elapsed) {
            tracing::warn!(%err, "frame incomplete");
        }
        renderer
            .screen_mut()
            .flush_to(&mut stdout)
            .context("failed to write frame")?;
        if let Some(at) = input_at {
            elapsed = Some(at.elapsed());
        }

        let key = match read_key(&mut term) {
            Ok(key) => key,
            Err(err) => {
                editor.request_quit(1, Some(format!("failed to read input: {err}")));
                Key::Noop
            }
        };
        input_at = Some(Instant::now());

        editor.process_key(key);
        handle_save(&mut editor);

        if let Some(quit) = editor.quit_request() {
            break quit.clone();
        }
    };

    term.leave().context("failed to restore terminal")?;
    tracing::info!(status = quit.status, "exit");

    if let Some(error) = quit.error {
        bail!(error);
    }
    Ok(quit.status)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let _log_guard = configure_logging();

    match run(&args) {
        Ok(status) => ExitCode::from(status),
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "fatal");
            eprintln!("ni: {err:#}");
            ExitCode::FAILURE
        }
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    fn press(editor: &mut Editor, keys: &str) {
        for b in keys.bytes() {
            editor.process_key(Key::Char(b));
        }
    }

    #[test]
    fn args_accept_optional_path() {
        let args = Args::try_parse_from(["ni"]).unwrap();
        assert_eq!(args.path, None);
        let args = Args::try_parse_from(["ni", "notes.txt"]).unwrap();
        assert_eq!(args.path, Some(PathBuf::from("notes.txt")));
    }

    #[test]
    fn zz_saves_through_handle_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zz.txt");
        let mut editor = Editor::new(24, 80);
        file::open(&mut editor, &path).unwrap();

        press(&mut editor, "ihi");
        editor.process_key(Key::Escape);
        press(&mut editor, "ZZ");
        handle_save(&mut editor);

        assert_eq!(fs::read_to_string(&path).unwrap(), "hi\n");
        assert_eq!(editor.quit_request().map(|q| q.status), Some(0));
        assert!(!editor.save_requested());
    }

    #[test]
    fn failed_save_cancels_quit() {
        let mut editor = Editor::new(24, 80);
        press(&mut editor, "ihi");
        editor.process_key(Key::Escape);
        press(&mut editor, "ZZ");
        handle_save(&mut editor);

        assert_eq!(editor.quit_request(), None);
        assert_eq!(editor.message(), "No file name");
        assert!(editor.document().is_dirty());
    }

    #[test]
    fn ctrl_s_saves_without_quitting() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.txt");
        fs::write(&path, "a\n").unwrap();
        let mut editor = Editor::new(24, 80);
        file::open(&mut editor, &path).unwrap();

        press(&mut editor, "x");
        editor.process_key(Key::ctrl(b's'));
        handle_save(&mut editor);

        assert_eq!(fs::read_to_string(&path).unwrap(), "\n");
        assert_eq!(editor.quit_request(), None);
    }
}
