//! Frame assembly.
//!
//! Each frame refreshes the view (gutter, wrap cache, scrolling), turns the viewport's row
//! plan into row strings, and paints only the rows whose text differs from what the engine
//! painted last time. The status row sits directly below the text area.
//!
//! The row cache is dropped on resize (`invalidate`), which forces a full repaint.

use crate::display::Display;
use crate::status::{StatusContext, build_status};
use anyhow::Result;
use core_model::{EditorModel, RowContent, RowPlan};
use core_text::{Buffer, char_len, slice_cols};
use std::time::Instant;
use tracing::trace;

#[derive(Debug, Default)]
pub struct RenderEngine {
    /// Text last painted on each screen row (text rows then the status row).
    painted: Vec<Option<String>>,
    frames: u64,
}

impl RenderEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget what is on screen; the next frame repaints every row.
    pub fn invalidate(&mut self) {
        self.painted.clear();
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn render(&mut self, model: &mut EditorModel, display: &mut dyn Display) -> Result<()> {
        let started = Instant::now();
        let (state, view) = model.split_state_and_view();
        let (cursor_row, cursor_col) = view.refresh(state);
        let viewport = &view.viewport;
        let height = viewport.height();
        let width = viewport.width();
        if self.painted.len() != height + 1 {
            self.painted = vec![None; height + 1];
        }

        let mut repainted = 0usize;
        for plan in viewport.plan_rows(&state.buffer) {
            let text = compose_row(&state.buffer, &plan, viewport.gutter());
            repainted += usize::from(self.paint(display, plan.screen_row, text)?);
        }
        let ctx = StatusContext::from_state(state, view.cursor);
        let status = build_status(&ctx, width);
        repainted += usize::from(self.paint(display, height, status)?);

        if state.command_line.is_active() {
            let col = char_len(state.command_line.buffer()).min(width.saturating_sub(1));
            display.move_cursor(height, col)?;
        } else {
            display.move_cursor(cursor_row, cursor_col)?;
        }
        display.flush()?;
        self.frames += 1;
        trace!(target: "render", frame = self.frames, repainted, top = viewport.top_line, elapsed_us = started.elapsed().as_micros() as u64, "frame");
        Ok(())
    }

    /// Paint `text` on `row` unless it is already there. Returns whether anything was written.
    fn paint(&mut self, display: &mut dyn Display, row: usize, text: String) -> Result<bool> {
        if self.painted[row].as_deref() == Some(text.as_str()) {
            return Ok(false);
        }
        display.clear_line(row)?;
        if !text.is_empty() {
            display.write(row, 0, &text)?;
        }
        self.painted[row] = Some(text);
        Ok(true)
    }
}

/// Screen text of one planned row: gutter (line number on the first wrap segment) followed by
/// the segment's chars.
fn compose_row(buf: &Buffer, plan: &RowPlan, gutter: usize) -> String {
    match &plan.content {
        RowContent::Filler => "~".to_string(),
        RowContent::Text {
            line,
            start_col,
            end_col,
            first,
        } => {
            let mut out = String::new();
            if gutter > 0 {
                if *first {
                    out.push_str(&format!("{:>w$} ", line + 1, w = gutter - 1));
                } else {
                    out.push_str(&" ".repeat(gutter));
                }
            }
            // one cell per char
            out.extend(
                slice_cols(buf.get(*line), *start_col, *end_col)
                    .chars()
                    .map(|c| if c == '\t' { ' ' } else { c }),
            );
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::MemoryDisplay;
    use core_state::{EditorState, Mode};
    use core_text::Position;
    use pretty_assertions::assert_eq;

    fn model(text: &str, width: usize, height: usize) -> EditorModel {
        EditorModel::new(
            EditorState::new(Buffer::from_str("t", text).unwrap()),
            width,
            height,
        )
    }

    #[test]
    fn paints_text_filler_and_status() {
        let mut m = model("hello\nworld", 30, 3);
        let mut d = MemoryDisplay::new(4);
        RenderEngine::new().render(&mut m, &mut d).unwrap();
        assert_eq!(d.row(0), "hello");
        assert_eq!(d.row(1), "world");
        assert_eq!(d.row(2), "~");
        assert!(d.row(3).starts_with("-- COMMAND --"));
        assert_eq!(d.cursor(), (0, 0));
        assert_eq!(d.flushes, 1);
    }

    #[test]
    fn soft_wraps_long_lines() {
        let mut m = model("abcdefghij", 4, 4);
        let mut d = MemoryDisplay::new(5);
        m.view_mut().cursor = Position::new(0, 9);
        RenderEngine::new().render(&mut m, &mut d).unwrap();
        assert_eq!(&d.rows()[..4], &["abcd", "efgh", "ij", "~"]);
        assert_eq!(d.cursor(), (2, 1));
    }

    #[test]
    fn line_number_gutter() {
        let mut m = model("a\nb", 20, 3);
        m.state_mut().show_line_numbers = true;
        let mut d = MemoryDisplay::new(4);
        RenderEngine::new().render(&mut m, &mut d).unwrap();
        assert_eq!(d.row(0), "1 a");
        assert_eq!(d.row(1), "2 b");
        assert_eq!(d.cursor(), (0, 2));
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut m = model("abc", 20, 2);
        let mut d = MemoryDisplay::new(3);
        let mut engine = RenderEngine::new();
        engine.render(&mut m, &mut d).unwrap();
        let writes = d.writes;
        engine.render(&mut m, &mut d).unwrap();
        assert_eq!(d.writes, writes);
        engine.invalidate();
        engine.render(&mut m, &mut d).unwrap();
        assert!(d.writes > writes);
        assert_eq!(engine.frames(), 3);
    }

    #[test]
    fn command_line_takes_status_row_and_cursor() {
        let mut m = model("abc", 20, 2);
        {
            let state = m.state_mut();
            state.mode = Mode::CommandLine;
            state.command_line.begin(':');
            state.command_line.push_char('w');
        }
        let mut d = MemoryDisplay::new(3);
        RenderEngine::new().render(&mut m, &mut d).unwrap();
        assert_eq!(d.row(2), ":w");
        assert_eq!(d.cursor(), (2, 2));
    }

    #[test]
    fn scrolls_to_keep_cursor_visible() {
        let mut m = model("0\n1\n2\n3\n4", 10, 2);
        m.view_mut().cursor = Position::new(4, 0);
        let mut d = MemoryDisplay::new(3);
        RenderEngine::new().render(&mut m, &mut d).unwrap();
        assert_eq!(d.row(0), "3");
        assert_eq!(d.row(1), "4");
        assert_eq!(d.cursor(), (1, 0));
    }
}
