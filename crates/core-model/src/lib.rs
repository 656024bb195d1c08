//! High-level editor model: `EditorState` plus the single `View` onto it.
//!
//! A `View` owns presentation state (cursor and viewport) so that `EditorState` stays
//! buffer-centric. Dispatch code borrows both halves at once through
//! [`EditorModel::split_state_and_view`].
//!
//! Core invariants (must hold after every dispatched action):
//! * The cursor line is a valid line index of the buffer.
//! * In command mode the cursor column rests on a character (`<= len - 1`, or 0 on an empty
//!   line); in insert mode it may equal the line length.

use core_state::{EditorState, Mode};
use core_text::Position;
use core_text::motion::last_col;

pub mod viewport;
pub use viewport::{RowContent, RowPlan, ScreenLine, Viewport};

#[derive(Debug, Clone)]
pub struct View {
    pub cursor: Position,
    pub viewport: Viewport,
}

impl View {
    pub fn new(cursor: Position, viewport: Viewport) -> Self {
        Self { cursor, viewport }
    }

    /// Clamp the cursor into the buffer according to the mode's column rule.
    pub fn clamp_cursor(&mut self, state: &EditorState) {
        let buf = &state.buffer;
        self.cursor.line = self.cursor.line.min(buf.last_line());
        let max = last_col(buf, self.cursor.line, state.mode == Mode::Insert);
        self.cursor.col = self.cursor.col.min(max);
    }

    /// Refresh viewport geometry for the current buffer and scroll the cursor into view.
    /// Returns the cursor's screen position.
    pub fn refresh(&mut self, state: &EditorState) -> (usize, usize) {
        self.viewport
            .set_gutter(&state.buffer, state.show_line_numbers);
        self.viewport.refresh(&state.buffer);
        self.viewport.project_cursor(&state.buffer, self.cursor)
    }
}

pub struct EditorModel {
    state: EditorState,
    view: View,
}

impl EditorModel {
    /// Model with the cursor at the origin and a `width` x `height` text area.
    pub fn new(state: EditorState, width: usize, height: usize) -> Self {
        Self {
            state,
            view: View::new(Position::origin(), Viewport::new(width, height)),
        }
    }

    /// Test/helper constructor allowing an already prepared view to be injected.
    pub fn with_view(mut view: View, state: EditorState) -> Self {
        view.clamp_cursor(&state);
        Self { state, view }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }
    pub fn state_mut(&mut self) -> &mut EditorState {
        &mut self.state
    }
    pub fn view(&self) -> &View {
        &self.view
    }
    pub fn view_mut(&mut self) -> &mut View {
        &mut self.view
    }

    /// Disjoint mutable borrows of the state and the view.
    pub fn split_state_and_view(&mut self) -> (&mut EditorState, &mut View) {
        (&mut self.state, &mut self.view)
    }

    pub fn cursor(&self) -> Position {
        self.view.cursor
    }

    pub fn into_state(self) -> EditorState {
        self.state
    }
}
