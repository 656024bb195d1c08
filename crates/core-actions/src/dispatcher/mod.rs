//! Dispatcher applying `Action` to mutable editor state.
//!
//! Decomposed into focused sub-modules:
//! * `motion`  - cursor movement and scrolling
//! * `mode`    - mode transitions (Command <-> Insert), including the insert entry side effects
//! * `edit`    - text mutation, yank and paste
//! * `undo`    - undo / redo / repeat
//! * `command` - command line editing, ex command execution and search
//!
//! Every handler leaves the cursor clamped to the mode's column rule; `dispatch` re-clamps
//! once more at the end so no handler can break the invariant.

use crate::Action;
use core_model::EditorModel;

mod command;
mod command_parser;
mod edit;
mod mode;
mod motion;
mod undo;

/// Result of dispatching a single `Action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchResult {
    pub dirty: bool,
    pub quit: bool,
}

impl DispatchResult {
    pub fn dirty() -> Self {
        Self {
            dirty: true,
            quit: false,
        }
    }
    pub fn clean() -> Self {
        Self {
            dirty: false,
            quit: false,
        }
    }
    pub fn quit() -> Self {
        Self {
            dirty: true,
            quit: true,
        }
    }
}

/// Apply an action to editor state. Returns `DispatchResult` describing whether
/// a render is needed (`dirty`) or the editor should exit (`quit`).
pub fn dispatch(action: Action, model: &mut EditorModel) -> DispatchResult {
    let (state, view) = model.split_state_and_view();
    tracing::trace!(target: "actions.dispatch", action = action.label(), mode = ?state.mode, line = view.cursor.line, col = view.cursor.col, "dispatch");

    let result = match action {
        Action::Motion(kind) => motion::handle_motion(kind, state, view),
        Action::Scroll(kind) => motion::handle_scroll(kind, state, view),
        Action::EnterInsert(entry) => mode::handle_enter_insert(entry, state, view),
        Action::LeaveInsert => mode::handle_leave_insert(state, view),
        Action::Edit(kind) => edit::handle_edit(kind, state, view),
        Action::Yank(kind) => edit::handle_yank(kind, state, view),
        Action::Paste { before } => edit::handle_paste(before, state, view),
        Action::Undo => undo::handle_undo(state, view),
        Action::Redo => undo::handle_redo(state, view),
        Action::RepeatLast => undo::handle_repeat(state, view),
        Action::CommandStart(_)
        | Action::CommandChar(_)
        | Action::CommandBackspace
        | Action::CommandCancel
        | Action::CommandExecute => command::handle_command_action(action, state, view),
        Action::SearchNext { reverse } => command::handle_search_next(reverse, state, view),
    };
    view.clamp_cursor(state);
    result
}
