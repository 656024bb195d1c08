//! Text mutation, yank and paste.
//!
//! Consecutive keystrokes of one kind coalesce into the pending operation:
//! * typed text (insert mode) extends a pending `InsertChar` whose end is the cursor;
//! * `x` / Delete extend a pending forward `DeleteChar` anchored at the cursor;
//! * Backspace / `X` extend a pending *backwards* `DeleteChar` whose anchor minus the removed
//!   length is the cursor.
//! Anything else (a line break, a command-mode operator, a motion) commits the run. Every
//! command-mode operator is applied through `EditorState::apply_edit` as one discrete edit.

use super::DispatchResult;
use crate::{EditKind, YankKind};
use core_model::View;
use core_state::undo::EditOp;
use core_state::{EditorState, Mode, Yank};
use core_text::motion::{self, Unit};
use core_text::{Buffer, Position, char_len};

pub(crate) fn handle_edit(
    kind: EditKind,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    let before = view.cursor;
    let changed = match kind {
        EditKind::InsertChar(c) => insert_text(state, view, &c.to_string()),
        EditKind::InsertTab => {
            let tab = state.settings.tab_text();
            insert_text(state, view, &tab)
        }
        EditKind::InsertNewline => {
            let changed = insert_text(state, view, "\n");
            state.commit_pending();
            changed
        }
        EditKind::Backspace => backspace(state, view),
        EditKind::DeleteUnder => delete_under(state, view),
        EditKind::DeleteBefore => delete_before(state, view),
        EditKind::DeleteWord(unit) => delete_word(state, view, unit),
        EditKind::DeleteLine => delete_line(state, view),
        EditKind::DeleteToEnd => delete_to_end(state, view),
        EditKind::ReplaceChar(c) => replace_char(state, view, c),
        EditKind::ToggleCase => toggle_case(state, view),
    };
    if !changed {
        return DispatchResult::clean();
    }
    tracing::trace!(target: "actions.dispatch", op = "edit", ?kind, line = before.line, col = before.col, to_line = view.cursor.line, to_col = view.cursor.col, "edit");
    DispatchResult::dirty()
}

fn char_at(buf: &Buffer, pos: Position) -> Option<String> {
    (pos.col < buf.line_len(pos.line))
        .then(|| buf.text_between(pos, Position::new(pos.line, pos.col + 1)))
}

fn insert_text(state: &mut EditorState, view: &mut View, text: &str) -> bool {
    if state.mode != Mode::Insert {
        return false;
    }
    let at = view.cursor;
    let op = EditOp::InsertChar {
        at,
        text: text.to_string(),
    };
    op.apply(&mut state.buffer);
    view.cursor = op.end_position();
    let continues = matches!(state.pending(), Some(p @ EditOp::InsertChar { .. }) if p.end_position() == at);
    if !continues {
        state.begin_pending(op);
    } else if let Some(pending) = state.pending_mut() {
        pending.append(text);
    }
    true
}

/// Remove the char left of the cursor, growing a backwards run. Stays on the line.
fn delete_left(state: &mut EditorState, view: &mut View) -> Option<String> {
    let cur = view.cursor;
    if cur.col == 0 {
        return None;
    }
    let at = Position::new(cur.line, cur.col - 1);
    let ch = char_at(&state.buffer, at)?;
    EditOp::DeleteChar {
        at,
        text: ch.clone(),
        backwards: false,
    }
    .apply(&mut state.buffer);
    let continues = matches!(
        state.pending(),
        Some(EditOp::DeleteChar { at: anchor, text, backwards: true })
            if anchor.line == cur.line && anchor.col.checked_sub(char_len(text)) == Some(cur.col)
    );
    if !continues {
        state.begin_pending(EditOp::DeleteChar {
            at: cur,
            text: ch.clone(),
            backwards: true,
        });
    } else if let Some(pending) = state.pending_mut() {
        pending.append(&ch);
    }
    view.cursor = at;
    Some(ch)
}

fn backspace(state: &mut EditorState, view: &mut View) -> bool {
    if state.mode != Mode::Insert {
        return false;
    }
    if delete_left(state, view).is_some() {
        return true;
    }
    let cur = view.cursor;
    if cur.line == 0 {
        return false;
    }
    let join = Position::new(cur.line - 1, state.buffer.line_len(cur.line - 1));
    state.apply_edit(EditOp::DeleteChar {
        at: join,
        text: "\n".into(),
        backwards: false,
    });
    view.cursor = join;
    true
}

/// Text of the pending run in reading order, for the clipboard.
fn pending_delete_text(state: &EditorState) -> Option<String> {
    match state.pending() {
        Some(EditOp::DeleteChar {
            text, backwards, ..
        }) => Some(if *backwards {
            text.chars().rev().collect()
        } else {
            text.clone()
        }),
        _ => None,
    }
}

fn delete_under(state: &mut EditorState, view: &mut View) -> bool {
    let cur = view.cursor;
    let text = match char_at(&state.buffer, cur) {
        Some(ch) => ch,
        None if state.mode == Mode::Insert && cur.line < state.buffer.last_line() => "\n".into(),
        None => return false,
    };
    EditOp::DeleteChar {
        at: cur,
        text: text.clone(),
        backwards: false,
    }
    .apply(&mut state.buffer);
    let continues = matches!(
        state.pending(),
        Some(EditOp::DeleteChar { at, backwards: false, .. }) if *at == cur
    );
    if !continues {
        state.begin_pending(EditOp::DeleteChar {
            at: cur,
            text,
            backwards: false,
        });
    } else if let Some(pending) = state.pending_mut() {
        pending.append(&text);
    }
    if state.mode == Mode::Command
        && let Some(run) = pending_delete_text(state)
    {
        state.clipboard = Some(Yank::Chars(run));
    }
    true
}

fn delete_before(state: &mut EditorState, view: &mut View) -> bool {
    if delete_left(state, view).is_none() {
        return false;
    }
    if let Some(run) = pending_delete_text(state) {
        state.clipboard = Some(Yank::Chars(run));
    }
    true
}

/// End of the `dw`/`yw` span: the next word start, or the line end when the next start
/// lies on another line (or does not exist).
fn word_span_end(buf: &Buffer, cur: Position, unit: Unit) -> Position {
    let mut end = cur;
    motion::next_start(buf, &mut end, unit);
    if end.line != cur.line || end == cur {
        end = Position::new(cur.line, buf.line_len(cur.line));
    }
    end
}

fn delete_span(state: &mut EditorState, from: Position, to: Position) -> bool {
    let text = state.buffer.text_between(from, to);
    if text.is_empty() {
        return false;
    }
    state.clipboard = Some(Yank::Chars(text.clone()));
    state.apply_edit(EditOp::DeleteChar {
        at: from,
        text,
        backwards: false,
    });
    true
}

fn delete_word(state: &mut EditorState, view: &mut View, unit: Unit) -> bool {
    let cur = view.cursor;
    let end = word_span_end(&state.buffer, cur, unit);
    delete_span(state, cur, end)
}

fn delete_to_end(state: &mut EditorState, view: &mut View) -> bool {
    let cur = view.cursor;
    let end = Position::new(cur.line, state.buffer.line_len(cur.line));
    delete_span(state, cur, end)
}

fn delete_line(state: &mut EditorState, view: &mut View) -> bool {
    let row = view.cursor.line;
    let old = state.buffer.get(row).to_string();
    state.clipboard = Some(Yank::Lines(vec![old.clone()]));
    if state.buffer.line_count() == 1 {
        if old.is_empty() {
            return false;
        }
        state.apply_edit(EditOp::ReplaceLine {
            row,
            old: vec![old],
            new: vec![String::new()],
        });
    } else {
        state.apply_edit(EditOp::DeleteLine {
            row,
            lines: vec![old],
        });
    }
    view.cursor = Position::new(row.min(state.buffer.last_line()), 0);
    true
}

fn replace_char(state: &mut EditorState, view: &mut View, c: char) -> bool {
    let cur = view.cursor;
    let Some(old) = char_at(&state.buffer, cur) else {
        return false;
    };
    state.apply_edit(EditOp::ReplaceChar {
        at: cur,
        old,
        new: c.to_string(),
    });
    true
}

fn toggle_case(state: &mut EditorState, view: &mut View) -> bool {
    let cur = view.cursor;
    let Some(old) = char_at(&state.buffer, cur) else {
        return false;
    };
    let new: String = old
        .chars()
        .flat_map(|c| {
            if c.is_uppercase() {
                c.to_lowercase().collect::<Vec<_>>()
            } else {
                c.to_uppercase().collect::<Vec<_>>()
            }
        })
        .collect();
    if new != old {
        state.apply_edit(EditOp::ReplaceChar { at: cur, old, new });
    }
    view.cursor.col += 1;
    true
}

pub(crate) fn handle_yank(
    kind: YankKind,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    let cur = view.cursor;
    let yank = match kind {
        YankKind::Word(unit) => {
            let end = word_span_end(&state.buffer, cur, unit);
            Yank::Chars(state.buffer.text_between(cur, end))
        }
        YankKind::Line => Yank::Lines(vec![state.buffer.get(cur.line).to_string()]),
    };
    tracing::trace!(target: "actions.dispatch", op = "yank", ?kind, line = cur.line, col = cur.col, "yank");
    state.clipboard = Some(yank);
    DispatchResult::clean()
}

pub(crate) fn handle_paste(
    before: bool,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    let Some(yank) = state.clipboard.clone() else {
        return DispatchResult::clean();
    };
    let cur = view.cursor;
    match yank {
        Yank::Chars(text) => {
            if text.is_empty() {
                return DispatchResult::clean();
            }
            let len = state.buffer.line_len(cur.line);
            let at = if before {
                cur
            } else {
                Position::new(cur.line, (cur.col + 1).min(len))
            };
            let op = EditOp::InsertChar { at, text };
            let end = op.end_position();
            state.apply_edit(op);
            view.cursor = Position::new(end.line, end.col.saturating_sub(1));
        }
        Yank::Lines(lines) => {
            let row = if before { cur.line } else { cur.line + 1 };
            state.apply_edit(EditOp::InsertLine { row, lines });
            view.cursor = Position::new(row, 0);
        }
    }
    tracing::trace!(target: "actions.dispatch", op = "paste", before, line = view.cursor.line, col = view.cursor.col, "paste");
    DispatchResult::dirty()
}
