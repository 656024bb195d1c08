//! Cursor motion and scrolling.
//!
//! Motions are pure reads of the buffer (see `core_text::motion`). Any cursor move ends the
//! current coalescing run, so the pending edit is committed first. In insert mode the cursor
//! may rest one column past the last char; command mode never does.

use super::DispatchResult;
use crate::{MotionKind, ScrollKind};
use core_model::{ScreenLine, View};
use core_state::{EditorState, Mode};
use core_text::motion;

pub(crate) fn handle_motion(
    kind: MotionKind,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    state.commit_pending();
    let buf = &state.buffer;
    let past_end = state.mode == Mode::Insert;
    let before = view.cursor;
    let mut unmatched = false;
    let pos = &mut view.cursor;
    match kind {
        MotionKind::Left => motion::left(pos),
        MotionKind::Right => motion::right(buf, pos, past_end),
        MotionKind::Up => motion::up(buf, pos, past_end),
        MotionKind::Down => motion::down(buf, pos, past_end),
        MotionKind::LineStart => motion::line_start(pos),
        MotionKind::FirstNonBlank => motion::first_non_blank(buf, pos),
        MotionKind::LineEnd => motion::line_end(buf, pos, past_end),
        MotionKind::PrevLineStart => {
            motion::up(buf, pos, past_end);
            motion::first_non_blank(buf, pos);
        }
        MotionKind::NextLineStart => {
            motion::down(buf, pos, past_end);
            motion::first_non_blank(buf, pos);
        }
        MotionKind::FirstLine => motion::goto_line(buf, pos, Some(1)),
        MotionKind::GotoLine(n) => motion::goto_line(buf, pos, n),
        MotionKind::NextStart(unit) => motion::next_start(buf, pos, unit),
        MotionKind::End(unit) => motion::end(buf, pos, unit),
        MotionKind::Start(unit) => motion::start(buf, pos, unit),
        MotionKind::BracketMatch => {
            match motion::bracket_match(buf, *pos) {
                Some(found) => *pos = found,
                None => unmatched = motion::on_bracket(buf, *pos),
            }
        }
        MotionKind::ScreenTop | MotionKind::ScreenMiddle | MotionKind::ScreenBottom => {
            let which = match kind {
                MotionKind::ScreenTop => ScreenLine::Top,
                MotionKind::ScreenMiddle => ScreenLine::Middle,
                _ => ScreenLine::Bottom,
            };
            pos.line = view.viewport.screen_line(buf, which);
            pos.col = 0;
        }
    }
    if unmatched {
        state.flash("No matching bracket");
        return DispatchResult::dirty();
    }
    if view.cursor == before {
        return DispatchResult::clean();
    }
    tracing::trace!(target: "actions.dispatch", op = "motion", ?kind, from_line = before.line, from_col = before.col, to_line = view.cursor.line, to_col = view.cursor.col, "motion");
    DispatchResult::dirty()
}

pub(crate) fn handle_scroll(
    kind: ScrollKind,
    state: &mut EditorState,
    view: &mut View,
) -> DispatchResult {
    state.commit_pending();
    let buf = &state.buffer;
    let top = view.viewport.top_line;
    let cursor = &mut view.cursor;
    match kind {
        ScrollKind::PageDown => view.viewport.page_down(buf, cursor),
        ScrollKind::PageUp => view.viewport.page_up(buf, cursor),
        ScrollKind::LineDown => view.viewport.scroll_down(buf, cursor),
        ScrollKind::LineUp => view.viewport.scroll_up(buf, cursor),
    }
    if view.viewport.top_line == top {
        return DispatchResult::clean();
    }
    tracing::trace!(target: "actions.dispatch", op = "scroll", ?kind, from = top, to = view.viewport.top_line, "scroll");
    DispatchResult::dirty()
}
