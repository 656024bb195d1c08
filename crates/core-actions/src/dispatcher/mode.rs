//! Mode transitions (Command <-> Insert).
//!
//! Entering insert mode first performs the entry key's positioning side effect; `o`/`O`/`s`/`S`
//! also edit the buffer and log that edit as its own committed operation. Leaving insert mode
//! commits the pending run and pulls the cursor back onto the last char.

use super::DispatchResult;
use crate::InsertEntry;
use core_model::View;
use core_state::undo::EditOp;
use core_state::{EditorState, Mode, Yank};
use core_text::{Position, motion};

pub(crate) fn handle_enter_insert(
    entry: InsertEntry,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    state.commit_pending();
    let cur = view.cursor;
    let len = state.buffer.line_len(cur.line);
    match entry {
        InsertEntry::Before => {}
        InsertEntry::FirstNonBlank => motion::first_non_blank(&state.buffer, &mut view.cursor),
        InsertEntry::After => {
            if len > 0 {
                view.cursor.col = (cur.col + 1).min(len);
            }
        }
        InsertEntry::LineEnd => view.cursor.col = len,
        InsertEntry::OpenBelow => {
            state.apply_edit(EditOp::InsertLine {
                row: cur.line + 1,
                lines: vec![String::new()],
            });
            view.cursor = Position::new(cur.line + 1, 0);
        }
        InsertEntry::OpenAbove => {
            state.apply_edit(EditOp::InsertLine {
                row: cur.line,
                lines: vec![String::new()],
            });
            view.cursor = Position::new(cur.line, 0);
        }
        InsertEntry::Substitute => {
            if cur.col < len {
                let text = state
                    .buffer
                    .text_between(cur, Position::new(cur.line, cur.col + 1));
                state.clipboard = Some(Yank::Chars(text.clone()));
                state.apply_edit(EditOp::DeleteChar {
                    at: cur,
                    text,
                    backwards: false,
                });
            }
        }
        InsertEntry::SubstituteLine => {
            let old = state.buffer.get(cur.line).to_string();
            state.clipboard = Some(Yank::Lines(vec![old.clone()]));
            state.apply_edit(EditOp::ReplaceLine {
                row: cur.line,
                old: vec![old],
                new: vec![String::new()],
            });
            view.cursor = Position::new(cur.line, 0);
        }
    }
    state.mode = Mode::Insert;
    tracing::debug!(target: "actions.dispatch", ?entry, line = view.cursor.line, col = view.cursor.col, "enter_insert");
    DispatchResult::dirty()
}

pub(crate) fn handle_leave_insert(state: &mut EditorState, view: &mut View) -> DispatchResult {
    if state.mode != Mode::Insert {
        return DispatchResult::clean();
    }
    state.commit_pending();
    let len = state.buffer.line_len(view.cursor.line);
    if len > 0 && view.cursor.col >= len {
        view.cursor.col = len - 1;
    }
    state.mode = Mode::Command;
    tracing::debug!(target: "actions.dispatch", line = view.cursor.line, col = view.cursor.col, "leave_insert");
    DispatchResult::dirty()
}
