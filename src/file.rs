// SPDX-License-Identifier: MIT
//
// File load and save.
//
// The on-disk format is plain newline-terminated text. Loading splits on
// `\n` and drops a trailing `\r` from each line; saving writes every line
// followed by `\n`. Bytes are taken as they are, no encoding is assumed.
//
// A file that does not exist yet opens as an empty document carrying its
// name, so the first save creates it. A file that does not fit the line
// pool (too many lines, or a line longer than a slot) is refused outright
// rather than loaded truncated, since saving it back would lose data.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use ni_editor::Editor;

/// Load `path` into the editor's (empty) document.
///
/// # Errors
///
/// Fails if the file exists but cannot be read, or does not fit the
/// document's capacity.
pub fn open(editor: &mut Editor, path: &Path) -> Result<()> {
    let name = path.display().to_string();
    editor.document_mut().set_filename(name.clone());

    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            tracing::info!(path = %name, "new file");
            editor.set_message(format!("New file: \"{name}\""));
            return Ok(());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("cannot open {name}"));
        }
    };

    let doc = editor.document_mut();
    let max_len = doc.line_capacity();
    for (number, line) in split_lines(&bytes).enumerate() {
        if line.len() > max_len {
            bail!("{name}: line {} is longer than {max_len} bytes", number + 1);
        }
        doc.append_line(line)
            .with_context(|| format!("{name}: more than {} lines", doc.capacity()))?;
    }
    doc.mark_clean();

    tracing::info!(path = %name, lines = doc.count(), "loaded");
    editor.set_message(format!("Loaded: \"{name}\""));
    Ok(())
}

/// Write the document back to its file.
///
/// # Errors
///
/// Fails if the document has no file name or the file cannot be written.
/// The document stays dirty in that case.
pub fn save(editor: &mut Editor) -> Result<()> {
    let Some(path) = editor.document().filename().map(PathBuf::from) else {
        bail!("No file name");
    };

    let file = File::create(&path).with_context(|| format!("cannot write {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for line in editor.document().lines() {
        out.write_all(line)?;
        out.write_all(b"\n")?;
    }
    out.flush()
        .with_context(|| format!("cannot write {}", path.display()))?;

    editor.document_mut().mark_clean();
    tracing::info!(path = %path.display(), lines = editor.document().count(), "saved");
    editor.set_message(format!("Saved: \"{}\"", path.display()));
    Ok(())
}

/// Lines of `bytes`: split on `\n`, each stripped of one trailing `\r`.
/// A final `\n` does not start another line.
fn split_lines(bytes: &[u8]) -> impl Iterator<Item = &[u8]> {
    let body = bytes.strip_suffix(b"\n").unwrap_or(bytes);
    let empty = bytes.is_empty();
    body.split(|&b| b == b'\n')
        .filter(move |_| !empty)
        .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
}
