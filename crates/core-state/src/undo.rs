//! Reversible edit operations and the linear edit log.
//!
//! Every [`EditOp`] stored in the log has already been applied to the buffer; the log only
//! ever replays (`redo`) or inverts (`undo`) them. The log keeps a single cursor (`applied`)
//! counting the operations currently in effect. Committing while `applied` is not at the tail
//! discards the redo tail.

use core_text::{Buffer, Position, char_len, slice_cols};
use tracing::trace;

/// A recorded mutation with enough payload to apply it and to invert it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditOp {
    /// `text` inserted at `at`; a `\n` inside `text` splits the line.
    InsertChar { at: Position, text: String },
    /// `text` removed starting at `at`; a `\n` inside `text` joins lines.
    ///
    /// While pending, a `backwards` op is anchored at the column where the run started and
    /// `text` holds the removed chars in removal order (right to left). `EditLog::commit`
    /// normalizes it into a plain forward delete.
    DeleteChar {
        at: Position,
        text: String,
        backwards: bool,
    },
    /// The span `old` at `at` overwritten with `new`.
    ReplaceChar {
        at: Position,
        old: String,
        new: String,
    },
    InsertLine { row: usize, lines: Vec<String> },
    DeleteLine { row: usize, lines: Vec<String> },
    ReplaceLine {
        row: usize,
        old: Vec<String>,
        new: Vec<String>,
    },
}

/// End position of `text` laid out starting at `at`.
fn span_end(at: Position, text: &str) -> Position {
    match text.rfind('\n') {
        None => Position::new(at.line, at.col + char_len(text)),
        Some(idx) => Position::new(
            at.line + text.matches('\n').count(),
            char_len(&text[idx + 1..]),
        ),
    }
}

fn insert_text(buf: &mut Buffer, at: Position, text: &str) {
    let line = buf.get(at.line);
    let before = slice_cols(line, 0, at.col).to_string();
    let after = slice_cols(line, at.col, char_len(line)).to_string();
    let mut pieces: Vec<String> = text.split('\n').map(str::to_string).collect();
    if let Some(first) = pieces.first_mut() {
        first.insert_str(0, &before);
    }
    if let Some(last) = pieces.last_mut() {
        last.push_str(&after);
    }
    buf.splice_lines(at.line, 1, pieces);
}

fn delete_text(buf: &mut Buffer, at: Position, text: &str) {
    let end = span_end(at, text);
    let last_row = end.line.min(buf.last_line());
    let head = slice_cols(buf.get(at.line), 0, at.col).to_string();
    let tail_line = buf.get(last_row);
    let tail = slice_cols(tail_line, end.col, char_len(tail_line));
    let joined = head + tail;
    buf.splice_lines(at.line, last_row - at.line + 1, vec![joined]);
}

/// Position `n` chars after `pos`, counting each line break as one char.
fn advance_chars(buf: &Buffer, mut pos: Position, mut n: usize) -> Position {
    loop {
        let avail = buf.line_len(pos.line).saturating_sub(pos.col);
        if n <= avail {
            pos.col += n;
            return pos;
        }
        if pos.line >= buf.last_line() {
            pos.col = buf.line_len(pos.line);
            return pos;
        }
        n -= avail + 1;
        pos.line += 1;
        pos.col = 0;
    }
}

impl EditOp {
    pub fn kind_name(&self) -> &'static str {
        match self {
            EditOp::InsertChar { .. } => "insert_char",
            EditOp::DeleteChar { .. } => "delete_char",
            EditOp::ReplaceChar { .. } => "replace_char",
            EditOp::InsertLine { .. } => "insert_line",
            EditOp::DeleteLine { .. } => "delete_line",
            EditOp::ReplaceLine { .. } => "replace_line",
        }
    }

    /// Mutate `buf` according to the operation.
    pub fn apply(&self, buf: &mut Buffer) {
        match self {
            EditOp::InsertChar { at, text } => insert_text(buf, *at, text),
            EditOp::DeleteChar { at, text, .. } => delete_text(buf, *at, text),
            EditOp::ReplaceChar { at, old, new } => {
                delete_text(buf, *at, old);
                insert_text(buf, *at, new);
            }
            EditOp::InsertLine { row, lines } => {
                buf.splice_lines(*row, 0, lines.clone());
            }
            EditOp::DeleteLine { row, lines } => {
                buf.splice_lines(*row, lines.len(), Vec::new());
            }
            EditOp::ReplaceLine { row, old, new } => {
                buf.splice_lines(*row, old.len(), new.clone());
            }
        }
    }

    /// The logically inverted operation.
    pub fn inverse(&self) -> EditOp {
        match self.clone() {
            EditOp::InsertChar { at, text } => EditOp::DeleteChar {
                at,
                text,
                backwards: false,
            },
            EditOp::DeleteChar { at, text, .. } => EditOp::InsertChar { at, text },
            EditOp::ReplaceChar { at, old, new } => EditOp::ReplaceChar {
                at,
                old: new,
                new: old,
            },
            EditOp::InsertLine { row, lines } => EditOp::DeleteLine { row, lines },
            EditOp::DeleteLine { row, lines } => EditOp::InsertLine { row, lines },
            EditOp::ReplaceLine { row, old, new } => EditOp::ReplaceLine {
                row,
                old: new,
                new: old,
            },
        }
    }

    /// Invert and immediately apply, returning the inverse.
    pub fn reverse(&self, buf: &mut Buffer) -> EditOp {
        let inv = self.inverse();
        inv.apply(buf);
        inv
    }

    /// Where the operation starts.
    pub fn position(&self) -> Position {
        match self {
            EditOp::InsertChar { at, .. }
            | EditOp::DeleteChar { at, .. }
            | EditOp::ReplaceChar { at, .. } => *at,
            EditOp::InsertLine { row, .. }
            | EditOp::DeleteLine { row, .. }
            | EditOp::ReplaceLine { row, .. } => Position::new(*row, 0),
        }
    }

    /// Position just past inserted text; for other ops the start position.
    pub fn end_position(&self) -> Position {
        match self {
            EditOp::InsertChar { at, text } => span_end(*at, text),
            _ => self.position(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            EditOp::InsertChar { text, .. } | EditOp::DeleteChar { text, .. } => text.is_empty(),
            EditOp::ReplaceChar { old, new, .. } => old.is_empty() && new.is_empty(),
            EditOp::InsertLine { lines, .. } | EditOp::DeleteLine { lines, .. } => {
                lines.is_empty()
            }
            EditOp::ReplaceLine { old, new, .. } => old == new,
        }
    }

    /// Extend the payload of a pending char op. No-op for other kinds.
    pub fn append(&mut self, more: &str) {
        match self {
            EditOp::InsertChar { text, .. } | EditOp::DeleteChar { text, .. } => {
                text.push_str(more)
            }
            _ => {}
        }
    }

    /// Copy of this operation re-targeted at `pos` for the repeat command.
    ///
    /// Deletes and replaces re-capture the text actually present at the new location so the
    /// repeated operation stays reversible. Returns `None` when nothing is there to remove.
    pub fn relocated(&self, buf: &Buffer, pos: Position) -> Option<EditOp> {
        let capture = |len: usize| {
            let end = advance_chars(buf, pos, len);
            buf.text_between(pos, end)
        };
        let op = match self {
            EditOp::InsertChar { text, .. } => EditOp::InsertChar {
                at: pos,
                text: text.clone(),
            },
            EditOp::DeleteChar { text, .. } => {
                let text = capture(char_len(text));
                if text.is_empty() {
                    return None;
                }
                EditOp::DeleteChar {
                    at: pos,
                    text,
                    backwards: false,
                }
            }
            EditOp::ReplaceChar { old, new, .. } => {
                let old = capture(char_len(old));
                if old.is_empty() {
                    return None;
                }
                EditOp::ReplaceChar {
                    at: pos,
                    old,
                    new: new.clone(),
                }
            }
            EditOp::InsertLine { lines, .. } => EditOp::InsertLine {
                row: pos.line,
                lines: lines.clone(),
            },
            EditOp::DeleteLine { lines, .. } => {
                let end = (pos.line + lines.len()).min(buf.line_count());
                let taken = buf.lines()[pos.line..end].to_vec();
                if pos.line == 0 && end == buf.line_count() {
                    EditOp::ReplaceLine {
                        row: 0,
                        old: taken,
                        new: vec![String::new()],
                    }
                } else {
                    EditOp::DeleteLine {
                        row: pos.line,
                        lines: taken,
                    }
                }
            }
            EditOp::ReplaceLine { old, new, .. } => {
                let end = (pos.line + old.len()).min(buf.line_count());
                EditOp::ReplaceLine {
                    row: pos.line,
                    old: buf.lines()[pos.line..end].to_vec(),
                    new: new.clone(),
                }
            }
        };
        Some(op)
    }
}

/// Linear undo history.
#[derive(Debug, Clone)]
pub struct EditLog {
    ops: Vec<EditOp>,
    /// Number of operations currently in effect (the cursor index plus one).
    applied: usize,
    /// Value of `applied` at the last save; `None` once that state became unreachable.
    saved: Option<usize>,
}

impl Default for EditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl EditLog {
    pub fn new() -> Self {
        Self {
            ops: Vec::new(),
            applied: 0,
            saved: Some(0),
        }
    }

    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    pub fn undo_depth(&self) -> usize {
        self.applied
    }

    pub fn redo_depth(&self) -> usize {
        self.ops.len() - self.applied
    }

    /// Append an already-applied operation, discarding any redo tail.
    pub fn commit(&mut self, mut op: EditOp) {
        if let EditOp::DeleteChar {
            at,
            text,
            backwards,
        } = &mut op
            && *backwards
        {
            *text = text.chars().rev().collect();
            at.col = at.col.saturating_sub(char_len(text));
            *backwards = false;
        }
        if self.applied < self.ops.len() {
            self.ops.truncate(self.applied);
            if self.saved.is_some_and(|s| s > self.applied) {
                self.saved = None;
            }
            trace!(target: "state.undo", kept = self.applied, "redo_tail_truncated");
        }
        trace!(target: "state.undo", kind = op.kind_name(), line = op.position().line, col = op.position().col, depth = self.applied + 1, "commit");
        self.ops.push(op);
        self.applied += 1;
    }

    /// Reverse the most recent operation. Returns where it happened, or `None` when there is
    /// nothing to undo.
    pub fn undo(&mut self, buf: &mut Buffer) -> Option<Position> {
        if self.applied == 0 {
            return None;
        }
        self.applied -= 1;
        let op = &self.ops[self.applied];
        op.reverse(buf);
        trace!(target: "state.undo", kind = op.kind_name(), undo_depth = self.applied, redo_depth = self.redo_depth(), "undo");
        Some(op.position())
    }

    /// Re-apply the next undone operation, or `None` when already at the newest edit.
    pub fn redo(&mut self, buf: &mut Buffer) -> Option<Position> {
        let op = self.ops.get(self.applied)?;
        op.apply(buf);
        self.applied += 1;
        trace!(target: "state.undo", kind = op.kind_name(), undo_depth = self.applied, redo_depth = self.redo_depth(), "redo");
        Some(op.position())
    }

    /// Re-apply a copy of the most recent operation at `cursor` and commit it.
    pub fn repeat_last(&mut self, buf: &mut Buffer, cursor: Position) -> Option<Position> {
        if self.applied == 0 {
            return None;
        }
        let op = self.ops[self.applied - 1].relocated(buf, cursor)?;
        op.apply(buf);
        let pos = op.position();
        self.commit(op);
        Some(pos)
    }

    pub fn mark_saved(&mut self) {
        self.saved = Some(self.applied);
    }

    /// True when the applied history differs from the last save point.
    pub fn is_dirty(&self) -> bool {
        self.saved != Some(self.applied)
    }
}
