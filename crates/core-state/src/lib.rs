//! Editor state: buffer, mode, edit log, clipboard, command line, and status metadata.
//!
//! - Undo history lives in `undo::EditLog` as a list of reversible operations. Text edits made
//!   by consecutive keystrokes of the same kind accumulate in a single *pending* operation that
//!   is committed to the log when the edit kind changes, the mode changes, or the cursor moves.
//! - Transient status messages carry a generation number. The runtime arms a timer for the
//!   newest generation; an expiry for an older generation is ignored.
//! - View concerns (cursor, scrolling) live in `core-model`; this crate stays buffer-centric.

use core_text::{Buffer, Direction, Position};
use regex::Regex;
use std::path::PathBuf;

pub mod undo;
use undo::{EditLog, EditOp};

/// Current editor mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and operator keys.
    Command,
    /// Text entry.
    Insert,
    /// Entering an ex command (`:`) or a search pattern (`/`, `?`).
    CommandLine,
}

impl Mode {
    /// Persistent status label.
    pub fn label(self) -> &'static str {
        match self {
            Mode::Command | Mode::CommandLine => "-- COMMAND --",
            Mode::Insert => "-- INSERT --",
        }
    }
}

/// Single-slot clipboard content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Yank {
    /// Char-wise text (may contain line breaks).
    Chars(String),
    /// Whole lines.
    Lines(Vec<String>),
}

/// Last search, reused by `n` / `N`.
#[derive(Debug, Clone)]
pub struct SearchState {
    pub regex: Regex,
    pub direction: Direction,
}

/// Line ending style detected from the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    Cr,
    Crlf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::Cr => "\r",
            LineEnding::Crlf => "\r\n",
        }
    }
}

/// Result of normalizing line endings.
pub struct NormalizedText {
    pub normalized: String,         // LF-only content
    pub original: LineEnding,       // majority style
    pub had_trailing_newline: bool, // original trailing newline presence
}

/// Normalize `input` to LF line breaks, reporting the dominant original style.
/// Ties resolve by precedence CRLF > LF > CR.
pub fn normalize_line_endings(input: &str) -> NormalizedText {
    let crlf = input.matches("\r\n").count();
    let lf = input.matches('\n').count() - crlf;
    let cr = input.matches('\r').count() - crlf;
    let had_trailing_newline = input.ends_with('\n') || input.ends_with('\r');
    let mut original = LineEnding::Lf;
    let mut max = 0usize;
    for (style, count) in [
        (LineEnding::Crlf, crlf),
        (LineEnding::Lf, lf),
        (LineEnding::Cr, cr),
    ] {
        if count > max {
            max = count;
            original = style;
        }
    }
    let normalized = if crlf == 0 && cr == 0 {
        input.to_string()
    } else {
        input.replace("\r\n", "\n").replace('\r', "\n")
    };
    NormalizedText {
        normalized,
        original,
        had_trailing_newline,
    }
}

/// Text being typed on the status row. The first char is the prefix (`:`, `/` or `?`).
#[derive(Debug, Default, Clone)]
pub struct CommandLineState {
    buf: String,
}

impl CommandLineState {
    pub fn is_active(&self) -> bool {
        !self.buf.is_empty()
    }
    /// Full text including the prefix (for rendering).
    pub fn buffer(&self) -> &str {
        &self.buf
    }
    pub fn prefix(&self) -> Option<char> {
        self.buf.chars().next()
    }
    /// Text after the prefix.
    pub fn body(&self) -> &str {
        self.prefix().map_or("", |p| &self.buf[p.len_utf8()..])
    }
    pub fn clear(&mut self) {
        self.buf.clear();
    }
    pub fn begin(&mut self, prefix: char) {
        self.buf.clear();
        self.buf.push(prefix);
    }
    pub fn push_char(&mut self, ch: char) {
        self.buf.push(ch);
    }
    /// Remove the last char. Returns false once the prefix itself was removed.
    pub fn backspace(&mut self) -> bool {
        self.buf.pop();
        !self.buf.is_empty()
    }
}

/// Insert-mode settings sourced from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditSettings {
    pub expandtab: bool,
    pub tabstop: usize,
}

impl Default for EditSettings {
    fn default() -> Self {
        Self {
            expandtab: true,
            tabstop: 4,
        }
    }
}

impl EditSettings {
    pub fn tab_text(&self) -> String {
        if self.expandtab {
            " ".repeat(self.tabstop.max(1))
        } else {
            "\t".to_string()
        }
    }
}

/// Transient status message tagged with the generation that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub generation: u64,
}

/// Top-level editor state container (single buffer).
pub struct EditorState {
    pub buffer: Buffer,
    pub mode: Mode,
    pub file_name: Option<PathBuf>,
    log: EditLog,
    pending: Option<EditOp>,
    pub clipboard: Option<Yank>,
    pub command_line: CommandLineState,
    pub search: Option<SearchState>,
    status: Option<StatusMessage>,
    status_generation: u64,
    flash_request: Option<u64>,
    pub show_line_numbers: bool,
    pub settings: EditSettings,
    pub original_line_ending: LineEnding,
    pub had_trailing_newline: bool,
}

impl EditorState {
    pub fn new(buffer: Buffer) -> Self {
        Self {
            buffer,
            mode: Mode::Command,
            file_name: None,
            log: EditLog::new(),
            pending: None,
            clipboard: None,
            command_line: CommandLineState::default(),
            search: None,
            status: None,
            status_generation: 0,
            flash_request: None,
            show_line_numbers: false,
            settings: EditSettings::default(),
            original_line_ending: LineEnding::Lf,
            had_trailing_newline: false,
        }
    }

    pub fn log(&self) -> &EditLog {
        &self.log
    }

    pub fn pending(&self) -> Option<&EditOp> {
        self.pending.as_ref()
    }

    pub fn pending_mut(&mut self) -> Option<&mut EditOp> {
        self.pending.as_mut()
    }

    /// Replace the pending operation, committing whatever was pending before.
    pub fn begin_pending(&mut self, op: EditOp) {
        self.commit_pending();
        self.pending = Some(op);
    }

    /// Commit the pending operation (if any, and non-empty) to the log.
    pub fn commit_pending(&mut self) {
        if let Some(op) = self.pending.take()
            && !op.is_empty()
        {
            self.log.commit(op);
        }
    }

    /// Apply `op` to the buffer and commit it as a discrete edit.
    pub fn apply_edit(&mut self, op: EditOp) {
        self.commit_pending();
        if op.is_empty() {
            return;
        }
        op.apply(&mut self.buffer);
        self.log.commit(op);
    }

    pub fn undo(&mut self) -> Option<Position> {
        self.commit_pending();
        self.log.undo(&mut self.buffer)
    }

    pub fn redo(&mut self) -> Option<Position> {
        self.commit_pending();
        self.log.redo(&mut self.buffer)
    }

    pub fn repeat_last(&mut self, cursor: Position) -> Option<Position> {
        self.commit_pending();
        self.log.repeat_last(&mut self.buffer, cursor)
    }

    /// Unsaved changes exist (including an uncommitted pending edit).
    pub fn is_dirty(&self) -> bool {
        self.log.is_dirty() || self.pending.as_ref().is_some_and(|op| !op.is_empty())
    }

    pub fn mark_saved(&mut self) {
        self.commit_pending();
        self.log.mark_saved();
    }

    /// Show a transient message and request a fresh expiry timer for it.
    pub fn flash<S: Into<String>>(&mut self, msg: S) -> u64 {
        self.status_generation += 1;
        let generation = self.status_generation;
        self.status = Some(StatusMessage {
            text: msg.into(),
            generation,
        });
        self.flash_request = Some(generation);
        generation
    }

    /// Generation whose expiry timer should be (re)armed, consumed by the runtime.
    pub fn take_flash_request(&mut self) -> Option<u64> {
        self.flash_request.take()
    }

    /// Clear the transient message if it still belongs to `generation`. Returns true when
    /// something was cleared.
    pub fn expire_status(&mut self, generation: u64) -> bool {
        if self
            .status
            .as_ref()
            .is_some_and(|m| m.generation == generation)
        {
            self.status = None;
            return true;
        }
        false
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn state(s: &str) -> EditorState {
        EditorState::new(Buffer::from_str("t", s).unwrap())
    }

    #[test]
    fn normalize_crlf_content() {
        let n = normalize_line_endings("a\r\nb\r\n");
        assert_eq!(n.normalized, "a\nb\n");
        assert_eq!(n.original, LineEnding::Crlf);
        assert!(n.had_trailing_newline);
    }

    #[test]
    fn normalize_lone_cr_and_lf_passthrough() {
        let n = normalize_line_endings("a\rb");
        assert_eq!(n.normalized, "a\nb");
        assert_eq!(n.original, LineEnding::Cr);
        assert!(!n.had_trailing_newline);
        let n = normalize_line_endings("x\ny");
        assert_eq!(n.normalized, "x\ny");
        assert_eq!(n.original, LineEnding::Lf);
    }

    #[test]
    fn command_line_backspace_over_prefix_cancels() {
        let mut cl = CommandLineState::default();
        cl.begin('/');
        cl.push_char('a');
        assert_eq!(cl.buffer(), "/a");
        assert_eq!(cl.body(), "a");
        assert!(cl.backspace());
        assert!(!cl.backspace());
        assert!(!cl.is_active());
    }

    #[test]
    fn stale_status_expiry_is_ignored() {
        let mut st = state("");
        let first = st.flash("one");
        let second = st.flash("two");
        assert_eq!(st.take_flash_request(), Some(second));
        assert!(!st.expire_status(first));
        assert_eq!(st.status_message(), Some("two"));
        assert!(st.expire_status(second));
        assert_eq!(st.status_message(), None);
    }

    #[test]
    fn pending_edit_counts_as_dirty_and_commits_on_undo() {
        let mut st = state("abc");
        let op = EditOp::InsertChar {
            at: Position::origin(),
            text: "X".into(),
        };
        op.apply(&mut st.buffer);
        st.begin_pending(op);
        assert!(st.is_dirty());
        assert_eq!(st.log().undo_depth(), 0);
        assert_eq!(st.undo(), Some(Position::origin()));
        assert_eq!(st.buffer.get(0), "abc");
        assert!(!st.is_dirty());
    }

    #[test]
    fn empty_pending_is_discarded() {
        let mut st = state("abc");
        st.begin_pending(EditOp::InsertChar {
            at: Position::origin(),
            text: String::new(),
        });
        st.commit_pending();
        assert_eq!(st.log().undo_depth(), 0);
    }

    #[test]
    fn tab_text_follows_expandtab() {
        let mut s = EditSettings::default();
        assert_eq!(s.tab_text(), "    ");
        s.expandtab = false;
        assert_eq!(s.tab_text(), "\t");
    }
}
