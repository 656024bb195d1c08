//! Undo / redo / repeat dispatch.
//!
//! The edit log does the work; this layer moves the cursor to where the edit happened and
//! reports history boundaries as transient status messages.

use super::DispatchResult;
use core_model::View;
use core_state::EditorState;
use core_text::Position;

fn land(
    state: &mut EditorState,
    view: &mut View,
    outcome: Option<Position>,
    op: &'static str,
    boundary: &'static str,
) -> DispatchResult {
    match outcome {
        Some(pos) => {
            view.cursor = pos;
            tracing::trace!(target: "actions.dispatch", op, line = pos.line, col = pos.col, undo_depth = state.log().undo_depth(), redo_depth = state.log().redo_depth(), "history");
        }
        None => {
            tracing::debug!(target: "actions.dispatch", op, "history_boundary");
            state.flash(boundary);
        }
    }
    DispatchResult::dirty()
}

pub(crate) fn handle_undo(state: &mut EditorState, view: &mut View) -> DispatchResult {
    let outcome = state.undo();
    land(state, view, outcome, "undo", "Already at the first edit")
}

pub(crate) fn handle_redo(state: &mut EditorState, view: &mut View) -> DispatchResult {
    let outcome = state.redo();
    land(state, view, outcome, "redo", "Already at the last edit")
}

pub(crate) fn handle_repeat(state: &mut EditorState, view: &mut View) -> DispatchResult {
    let outcome = state.repeat_last(view.cursor);
    land(state, view, outcome, "repeat", "Nothing to repeat")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_model::Viewport;
    use core_text::Buffer;

    #[test]
    fn empty_history_flashes() {
        let mut st = EditorState::new(Buffer::from_str("t", "abc").unwrap());
        let mut v = View::new(Position::origin(), Viewport::new(10, 5));
        handle_undo(&mut st, &mut v);
        assert_eq!(st.status_message(), Some("Already at the first edit"));
        handle_redo(&mut st, &mut v);
        assert_eq!(st.status_message(), Some("Already at the last edit"));
        handle_repeat(&mut st, &mut v);
        assert_eq!(st.status_message(), Some("Nothing to repeat"));
        assert!(st.take_flash_request().is_some());
    }
}
