//! Viewport / render planner.
//!
//! Tracks the first visible buffer row (`top_line`) and the soft-wrap geometry of the text
//! area. Each buffer line occupies `max(1, ceil(len / text_width))` screen rows. The planner
//! decides when to scroll so the cursor stays on screen and produces the row plan consumed by
//! the renderer.
//!
//! Invariants:
//! * `text_width() >= 1` and `height >= 1` (degenerate terminals are clamped).
//! * After `project_cursor`, the cursor row is visible unless the cursor's own line is taller
//!   than the screen, in which case that line starts at the top.

use core_text::{Buffer, Position, char_len};
use tracing::trace;

/// Which screen line `H` / `M` / `L` target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenLine {
    Top,
    Middle,
    Bottom,
}

/// What one screen row shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowContent {
    /// Char columns `[start_col, end_col)` of buffer row `line`; `first` marks the first
    /// wrap segment (the one carrying the line number).
    Text {
        line: usize,
        start_col: usize,
        end_col: usize,
        first: bool,
    },
    /// Past the end of the buffer.
    Filler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPlan {
    pub screen_row: usize,
    pub content: RowContent,
}

#[derive(Debug, Clone)]
pub struct Viewport {
    pub top_line: usize,
    width: usize,
    height: usize,
    gutter: usize,
    /// Heights of the rows shown from `top_line`, valid for `cached_revision`.
    line_heights: Vec<usize>,
    cached_revision: Option<u64>,
}

/// Number of decimal digits in `n` (at least 1).
fn digits(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}

impl Viewport {
    /// `width` columns by `height` text rows (status row excluded).
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            top_line: 0,
            width: width.max(1),
            height: height.max(1),
            gutter: 0,
            line_heights: Vec::new(),
            cached_revision: None,
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.cached_revision = None;
        trace!(target: "model.viewport", width = self.width, height = self.height, "resize");
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn gutter(&self) -> usize {
        self.gutter
    }

    /// Enable or disable the line-number gutter; its width tracks the line count.
    pub fn set_gutter(&mut self, buf: &Buffer, show: bool) {
        let gutter = if show { digits(buf.line_count()) + 1 } else { 0 };
        if gutter != self.gutter {
            self.gutter = gutter;
            self.cached_revision = None;
        }
    }

    /// Columns available for text after the gutter.
    pub fn text_width(&self) -> usize {
        self.width.saturating_sub(self.gutter).max(1)
    }

    /// Screen rows occupied by buffer row `row`.
    pub fn row_height(&self, buf: &Buffer, row: usize) -> usize {
        buf.line_len(row).div_ceil(self.text_width()).max(1)
    }

    pub fn line_heights(&self) -> &[usize] {
        &self.line_heights
    }

    /// Recompute the cached heights when the buffer or geometry changed. Returns true when a
    /// full recompute happened.
    pub fn refresh(&mut self, buf: &Buffer) -> bool {
        self.top_line = self.top_line.min(buf.last_line());
        if self.cached_revision == Some(buf.revision()) {
            return false;
        }
        self.recompute(buf);
        true
    }

    fn recompute(&mut self, buf: &Buffer) {
        self.line_heights.clear();
        let mut used = 0;
        let mut row = self.top_line;
        while row < buf.line_count() && used < self.height {
            let h = self.row_height(buf, row);
            self.line_heights.push(h);
            used += h;
            row += 1;
        }
        self.cached_revision = Some(buf.revision());
        trace!(target: "model.viewport", top = self.top_line, rows = self.line_heights.len(), "line_heights_recomputed");
    }

    /// Scroll as needed so `cursor` is visible and return its (screen row, screen column).
    pub fn project_cursor(&mut self, buf: &Buffer, cursor: Position) -> (usize, usize) {
        let w = self.text_width();
        let start_top = self.top_line;
        if cursor.line < self.top_line {
            self.top_line = cursor.line;
        }
        let mut y = 0;
        for _ in 0..=buf.line_count() {
            y = (self.top_line..cursor.line)
                .map(|row| self.row_height(buf, row))
                .sum::<usize>()
                + cursor.col / w;
            if y < self.height || self.top_line >= cursor.line {
                break;
            }
            self.top_line += 1;
        }
        if self.top_line != start_top {
            trace!(target: "model.viewport", from = start_top, to = self.top_line, "scroll");
            self.recompute(buf);
        }
        (y.min(self.height - 1), self.gutter + cursor.col % w)
    }

    /// Buffer rows that fit completely on screen from `top_line` (at least 1).
    pub fn screen_lines(&self, buf: &Buffer) -> usize {
        let mut used = 0;
        let mut count = 0;
        for row in self.top_line..buf.line_count() {
            used += self.row_height(buf, row);
            if used > self.height {
                break;
            }
            count += 1;
        }
        count.max(1)
    }

    /// Buffer row shown at the top, middle or bottom of the screen.
    pub fn screen_line(&self, buf: &Buffer, which: ScreenLine) -> usize {
        let n = self.screen_lines(buf);
        let row = match which {
            ScreenLine::Top => self.top_line,
            ScreenLine::Middle => self.top_line + (n - 1) / 2,
            ScreenLine::Bottom => self.top_line + n - 1,
        };
        row.min(buf.last_line())
    }

    /// Next page: the last fully visible line minus one becomes the top.
    pub fn page_down(&mut self, buf: &Buffer, cursor: &mut Position) {
        if self.top_line >= buf.last_line() {
            return;
        }
        let step = self.screen_lines(buf).saturating_sub(1).max(1);
        self.top_line = (self.top_line + step).min(buf.last_line());
        *cursor = Position::new(self.top_line, 0);
    }

    /// Previous page: the current top line becomes the last visible line.
    pub fn page_up(&mut self, buf: &Buffer, cursor: &mut Position) {
        if self.top_line == 0 {
            return;
        }
        let old_top = self.top_line;
        let mut used = self.row_height(buf, old_top);
        let mut new_top = old_top;
        while new_top > 0 {
            let h = self.row_height(buf, new_top - 1);
            if used + h > self.height {
                break;
            }
            used += h;
            new_top -= 1;
        }
        if new_top == old_top {
            new_top -= 1;
        }
        self.top_line = new_top;
        *cursor = Position::new(old_top.min(self.top_line + self.screen_lines(buf) - 1), 0);
    }

    /// Scroll the text up one line (`Ctrl-E`), dragging the cursor along if it left the top.
    pub fn scroll_down(&mut self, buf: &Buffer, cursor: &mut Position) {
        if self.top_line >= buf.last_line() {
            return;
        }
        self.top_line += 1;
        if cursor.line < self.top_line {
            cursor.line = self.top_line;
        }
    }

    /// Scroll the text down one line (`Ctrl-Y`), dragging the cursor along if it left the bottom.
    pub fn scroll_up(&mut self, buf: &Buffer, cursor: &mut Position) {
        if self.top_line == 0 {
            return;
        }
        self.top_line -= 1;
        let bottom = self.top_line + self.screen_lines(buf) - 1;
        if cursor.line > bottom {
            cursor.line = bottom;
        }
    }

    /// Row-by-row plan of the text area.
    pub fn plan_rows(&self, buf: &Buffer) -> Vec<RowPlan> {
        let w = self.text_width();
        let mut out = Vec::with_capacity(self.height);
        let mut row = self.top_line;
        while out.len() < self.height {
            if row >= buf.line_count() {
                out.push(RowPlan {
                    screen_row: out.len(),
                    content: RowContent::Filler,
                });
                continue;
            }
            let len = char_len(buf.get(row));
            for seg in 0..self.row_height(buf, row) {
                if out.len() >= self.height {
                    break;
                }
                out.push(RowPlan {
                    screen_row: out.len(),
                    content: RowContent::Text {
                        line: row,
                        start_col: seg * w,
                        end_col: ((seg + 1) * w).min(len),
                        first: seg == 0,
                    },
                });
            }
            row += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buf(s: &str) -> Buffer {
        Buffer::from_str("t", s).unwrap()
    }

    fn numbered(n: usize) -> Buffer {
        let lines: Vec<String> = (0..n).map(|i| i.to_string()).collect();
        Buffer::from_lines("t", lines)
    }

    #[test]
    fn wrapped_heights() {
        let b = buf("\nabcd\nabcde");
        let vp = Viewport::new(4, 10);
        assert_eq!(vp.row_height(&b, 0), 1);
        assert_eq!(vp.row_height(&b, 1), 1);
        assert_eq!(vp.row_height(&b, 2), 2);
    }

    #[test]
    fn project_cursor_scrolls_down_and_up() {
        let b = numbered(10);
        let mut vp = Viewport::new(10, 5);
        assert_eq!(vp.project_cursor(&b, Position::new(4, 0)), (4, 0));
        assert_eq!(vp.top_line, 0);
        assert_eq!(vp.project_cursor(&b, Position::new(5, 0)), (4, 0));
        assert_eq!(vp.top_line, 1);
        assert_eq!(vp.project_cursor(&b, Position::new(9, 0)), (4, 0));
        assert_eq!(vp.top_line, 5);
        assert_eq!(vp.project_cursor(&b, Position::new(2, 0)), (0, 0));
        assert_eq!(vp.top_line, 2);
    }

    #[test]
    fn project_cursor_accounts_for_wrap() {
        let b = buf("abcdefgh\nx\ny");
        let mut vp = Viewport::new(4, 3);
        // line 0 takes two rows, cursor on col 5 sits on the second.
        assert_eq!(vp.project_cursor(&b, Position::new(0, 5)), (1, 1));
        // line 2 would be screen row 3: scroll one buffer line.
        assert_eq!(vp.project_cursor(&b, Position::new(2, 0)), (1, 0));
        assert_eq!(vp.top_line, 1);
    }

    #[test]
    fn project_cursor_on_oversized_line_terminates() {
        let b = buf(&"x".repeat(100));
        let mut vp = Viewport::new(4, 3);
        let (row, _) = vp.project_cursor(&b, Position::new(0, 99));
        assert_eq!(row, 2);
        assert_eq!(vp.top_line, 0);
    }

    #[test]
    fn gutter_shrinks_text_width() {
        let b = numbered(120);
        let mut vp = Viewport::new(10, 5);
        vp.set_gutter(&b, true);
        assert_eq!(vp.gutter(), 4);
        assert_eq!(vp.text_width(), 6);
        assert_eq!(vp.project_cursor(&b, Position::new(0, 1)), (0, 5));
        vp.set_gutter(&b, false);
        assert_eq!(vp.text_width(), 10);
    }

    #[test]
    fn refresh_recomputes_on_revision_change_only() {
        let mut b = numbered(3);
        let mut vp = Viewport::new(10, 5);
        assert!(vp.refresh(&b));
        assert!(!vp.refresh(&b));
        assert_eq!(vp.line_heights(), &[1, 1, 1]);
        b.set(0, "a much longer line");
        assert!(vp.refresh(&b));
        assert_eq!(vp.line_heights(), &[2, 1, 1]);
    }

    #[test]
    fn page_down_and_up() {
        let b = numbered(20);
        let mut vp = Viewport::new(10, 5);
        let mut cur = Position::origin();
        vp.page_down(&b, &mut cur);
        assert_eq!(vp.top_line, 4);
        assert_eq!(cur, Position::new(4, 0));
        vp.page_up(&b, &mut cur);
        assert_eq!(vp.top_line, 0);
        assert_eq!(cur, Position::new(4, 0));
        vp.top_line = 19;
        let before = cur;
        vp.page_down(&b, &mut cur);
        assert_eq!(cur, before, "no-op at last line");
    }

    #[test]
    fn scroll_keeps_cursor_on_screen() {
        let b = numbered(20);
        let mut vp = Viewport::new(10, 5);
        let mut cur = Position::origin();
        vp.scroll_down(&b, &mut cur);
        assert_eq!(vp.top_line, 1);
        assert_eq!(cur.line, 1);
        cur.line = 5;
        vp.scroll_up(&b, &mut cur);
        assert_eq!(vp.top_line, 0);
        assert_eq!(cur.line, 4);
    }

    #[test]
    fn screen_line_targets() {
        let b = numbered(20);
        let mut vp = Viewport::new(10, 5);
        vp.top_line = 3;
        assert_eq!(vp.screen_line(&b, ScreenLine::Top), 3);
        assert_eq!(vp.screen_line(&b, ScreenLine::Middle), 5);
        assert_eq!(vp.screen_line(&b, ScreenLine::Bottom), 7);
        let short = numbered(2);
        vp.top_line = 0;
        assert_eq!(vp.screen_line(&short, ScreenLine::Bottom), 1);
    }

    #[test]
    fn plan_rows_wraps_and_fills() {
        let b = buf("abcdef\nx");
        let vp = Viewport::new(4, 4);
        let plan = vp.plan_rows(&b);
        assert_eq!(plan.len(), 4);
        assert_eq!(
            plan[1].content,
            RowContent::Text {
                line: 0,
                start_col: 4,
                end_col: 6,
                first: false
            }
        );
        assert_eq!(plan[3].content, RowContent::Filler);
    }
}
