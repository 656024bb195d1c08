//! File IO helpers: load into a `Buffer`, write back, and dump a recovery copy.
//!
//! Synchronous and minimal. Loading normalizes line endings and records the dominant style
//! and trailing-newline presence in the state; writing re-expands both so an untouched file
//! round-trips byte for byte.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Context;
use core_state::{EditorState, LineEnding, normalize_line_endings};
use core_text::Buffer;

use crate::CommandError;

/// A loaded (or newly bound) file ready to become the editor's buffer.
pub struct OpenSuccess {
    pub buffer: Buffer,
    pub file_name: PathBuf,
    pub original_line_ending: LineEnding,
    pub had_trailing_newline: bool,
    /// The path did not exist; the buffer is empty.
    pub is_new: bool,
}

impl fmt::Debug for OpenSuccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenSuccess")
            .field("file_name", &self.file_name)
            .field("lines", &self.buffer.line_count())
            .field("original_line_ending", &self.original_line_ending)
            .field("had_trailing_newline", &self.had_trailing_newline)
            .field("is_new", &self.is_new)
            .finish()
    }
}

impl OpenSuccess {
    /// Editor state owning the loaded buffer and its file metadata.
    pub fn into_state(self) -> EditorState {
        let mut state = EditorState::new(self.buffer);
        state.file_name = Some(self.file_name);
        state.original_line_ending = self.original_line_ending;
        state.had_trailing_newline = self.had_trailing_newline;
        state
    }
}

/// Open a file path into a new Buffer applying line ending normalization. A missing file
/// yields an empty buffer bound to `path`.
pub fn open_file(path: &Path) -> Result<OpenSuccess, CommandError> {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("file")
        .to_string();
    let io_err = |source| CommandError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(target: "io", path = %path.display(), "new_file");
            return Ok(OpenSuccess {
                buffer: Buffer::from_lines(name, Vec::new()),
                file_name: path.to_path_buf(),
                original_line_ending: LineEnding::Lf,
                had_trailing_newline: true,
                is_new: true,
            });
        }
        Err(e) => {
            tracing::error!(target: "io", path = %path.display(), error = %e, "file_open_error");
            return Err(io_err(e));
        }
    };
    let norm = normalize_line_endings(&content);
    let buffer =
        Buffer::from_str(name, &norm.normalized).map_err(|e| io_err(std::io::Error::other(e)))?;
    tracing::info!(target: "io", path = %path.display(), lines = buffer.line_count(), ending = ?norm.original, "file_opened");
    Ok(OpenSuccess {
        buffer,
        file_name: path.to_path_buf(),
        original_line_ending: norm.original,
        had_trailing_newline: norm.had_trailing_newline,
        is_new: false,
    })
}

/// Buffer text with the original line ending style and trailing newline restored.
pub fn serialize(state: &EditorState) -> String {
    let ending = state.original_line_ending.as_str();
    let mut content = state.buffer.lines().join(ending);
    if state.had_trailing_newline {
        content.push_str(ending);
    }
    content
}

/// What a successful write produced, rendered as the status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub lines: usize,
    pub bytes: usize,
}

impl fmt::Display for WriteSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "\"{}\" {}L, {}B written",
            self.path.display(),
            self.lines,
            self.bytes
        )
    }
}

/// Write the buffer to `target`, or to the bound file name. An unnamed buffer adopts
/// `target` as its name; writing the bound file records the save point.
pub fn write_file(
    state: &mut EditorState,
    target: Option<&Path>,
) -> Result<WriteSummary, CommandError> {
    let path = match (target, state.file_name.as_ref()) {
        (Some(p), _) => p.to_path_buf(),
        (None, Some(existing)) => existing.clone(),
        (None, None) => return Err(CommandError::NoFileName),
    };
    let content = serialize(state);
    if let Err(source) = std::fs::write(&path, content.as_bytes()) {
        tracing::error!(target: "io", path = %path.display(), error = %source, "file_write_error");
        return Err(CommandError::Io { path, source });
    }
    if state.file_name.is_none() {
        state.file_name = Some(path.clone());
    }
    if state.file_name.as_deref() == Some(path.as_path()) {
        state.mark_saved();
    }
    tracing::info!(target: "io", path = %path.display(), bytes = content.len(), "file_written");
    Ok(WriteSummary {
        path,
        lines: state.buffer.line_count(),
        bytes: content.len(),
    })
}

/// Best-effort dump of the current buffer after a fatal error.
pub fn write_recovery(state: &EditorState, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, serialize(state))
        .with_context(|| format!("writing recovery file {}", path.display()))?;
    tracing::warn!(target: "io", path = %path.display(), "recovery_written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn open_file_normalizes_and_sets_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.txt");
        std::fs::write(&path, "line1\r\nline2\r\nline3\r\n").unwrap();
        let s = open_file(&path).unwrap();
        assert_eq!(s.buffer.lines(), &["line1", "line2", "line3"]);
        assert_eq!(s.original_line_ending, LineEnding::Crlf);
        assert!(s.had_trailing_newline);
        assert!(!s.is_new);
    }

    #[test]
    fn missing_file_opens_empty_and_bound() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("new.txt");
        let s = open_file(&path).unwrap();
        assert!(s.is_new);
        assert_eq!(s.buffer.lines(), &[String::new()]);
        let state = s.into_state();
        assert_eq!(state.file_name.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn untouched_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rt.txt");
        std::fs::write(&path, "a\r\n\r\nb").unwrap();
        let mut state = open_file(&path).unwrap().into_state();
        write_file(&mut state, None).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\r\n\r\nb");
    }

    #[test]
    fn write_without_name_fails() {
        let mut state = EditorState::new(Buffer::from_str("t", "x").unwrap());
        assert!(matches!(
            write_file(&mut state, None),
            Err(CommandError::NoFileName)
        ));
    }

    #[test]
    fn write_to_other_path_keeps_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let bound = dir.path().join("bound.txt");
        let other = dir.path().join("other.txt");
        let mut state = EditorState::new(Buffer::from_str("t", "x").unwrap());
        state.file_name = Some(bound.clone());
        state.apply_edit(core_state::undo::EditOp::InsertLine {
            row: 1,
            lines: vec!["y".into()],
        });
        let summary = write_file(&mut state, Some(&other)).unwrap();
        assert_eq!(summary.lines, 2);
        assert!(state.is_dirty());
        write_file(&mut state, None).unwrap();
        assert!(!state.is_dirty());
        assert_eq!(std::fs::read_to_string(&bound).unwrap(), "x\ny");
    }

    #[test]
    fn unnamed_buffer_adopts_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("adopt.txt");
        let mut state = EditorState::new(Buffer::from_str("t", "x").unwrap());
        let summary = write_file(&mut state, Some(&path)).unwrap();
        assert_eq!(summary.to_string(), format!("\"{}\" 1L, 1B written", path.display()));
        assert_eq!(state.file_name.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn recovery_dump_writes_buffer() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("before_crash_text");
        let state = EditorState::new(Buffer::from_str("t", "keep me").unwrap());
        write_recovery(&state, &path).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep me");
    }
}
