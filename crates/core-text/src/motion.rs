//! Cursor motion helpers.
//!
//! These operate purely on a `Buffer` + `Position` pair and are free of editor state.
//! Two character classes drive the word motions: *word* characters (alphanumerics and
//! underscore) versus everything else, with whitespace forming its own class. The coarser
//! *term* unit treats any run of non-whitespace as one unit.
//!
//! Run scanners (`advance_*`) work on a line's chars with signed indices: a scan may
//! stop one step outside the line (`-1` or `len`), which callers use to detect that
//! the line had no further runs in that direction.

use crate::{Buffer, Direction, Position};

/// Granularity of a word-like motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Runs of word characters, runs of punctuation, runs of whitespace.
    Word,
    /// Runs of non-whitespace.
    Term,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Word,
    Space,
    Other,
}

pub fn class_of(c: char) -> CharClass {
    if c == '_' || c.is_alphanumeric() {
        CharClass::Word
    } else if c.is_whitespace() {
        CharClass::Space
    } else {
        CharClass::Other
    }
}

fn in_range(line: &[char], idx: isize) -> bool {
    idx >= 0 && (idx as usize) < line.len()
}

/// Step over one run of the class of the char at `idx`.
pub fn advance_word(line: &[char], mut idx: isize, dir: Direction) -> isize {
    if !in_range(line, idx) {
        return idx;
    }
    let class = class_of(line[idx as usize]);
    while in_range(line, idx) && class_of(line[idx as usize]) == class {
        idx += dir.step();
    }
    idx
}

/// Step over a run of non-whitespace.
pub fn advance_term(line: &[char], mut idx: isize, dir: Direction) -> isize {
    while in_range(line, idx) && !line[idx as usize].is_whitespace() {
        idx += dir.step();
    }
    idx
}

/// Step over a run of whitespace.
pub fn advance_spaces(line: &[char], mut idx: isize, dir: Direction) -> isize {
    while in_range(line, idx) && line[idx as usize].is_whitespace() {
        idx += dir.step();
    }
    idx
}

fn advance_unit(line: &[char], idx: isize, dir: Direction, unit: Unit) -> isize {
    match unit {
        Unit::Word => advance_word(line, idx, dir),
        Unit::Term => advance_term(line, idx, dir),
    }
}

fn chars(buf: &Buffer, row: usize) -> Vec<char> {
    buf.get(row).chars().collect()
}

/// Last column the cursor may rest on. `past_end` allows the insert-mode slot after
/// the final char.
pub fn last_col(buf: &Buffer, row: usize, past_end: bool) -> usize {
    let len = buf.line_len(row);
    if past_end { len } else { len.saturating_sub(1) }
}

/// Move to the start of the next word/term (`w`/`W`). Running off the line moves to the
/// next line's first column; on the last line this is a no-op.
pub fn next_start(buf: &Buffer, pos: &mut Position, unit: Unit) {
    let line = chars(buf, pos.line);
    let mut idx = pos.col as isize;
    idx = advance_unit(&line, idx, Direction::Forward, unit);
    idx = advance_spaces(&line, idx, Direction::Forward);
    if idx as usize >= line.len() {
        if pos.line < buf.last_line() {
            pos.line += 1;
            pos.col = 0;
        }
    } else {
        pos.col = idx as usize;
    }
}

/// Move to the end of the current or next word/term (`e`/`E`).
pub fn end(buf: &Buffer, pos: &mut Position, unit: Unit) {
    let mut row = pos.line;
    let mut line = chars(buf, row);
    let mut idx = pos.col as isize + 1;
    if idx as usize >= line.len() && row < buf.last_line() {
        row += 1;
        line = chars(buf, row);
        idx = 0;
    }
    idx = advance_spaces(&line, idx, Direction::Forward);
    idx = advance_unit(&line, idx, Direction::Forward, unit);
    pos.line = row;
    pos.col = (idx - 1).max(0) as usize;
}

/// Move to the start of the current or previous word/term (`b`/`B`).
///
/// Backing up past column 0 continues on the previous line's last char; runs of
/// empty or blank lines are skipped. Reaching the top of the buffer clamps to (0, 0).
pub fn start(buf: &Buffer, pos: &mut Position, unit: Unit) {
    let mut row = pos.line;
    let mut idx = pos.col as isize - 1;
    for _ in 0..=buf.line_count() {
        let line = chars(buf, row);
        if in_range(&line, idx) && line[idx as usize].is_whitespace() {
            idx = advance_spaces(&line, idx, Direction::Backward);
        }
        if idx < 0 {
            if row == 0 {
                *pos = Position::origin();
                return;
            }
            row -= 1;
            idx = buf.line_len(row) as isize - 1;
            continue;
        }
        idx = advance_unit(&line, idx, Direction::Backward, unit);
        pos.line = row;
        pos.col = (idx + 1) as usize;
        return;
    }
    *pos = Position::origin();
}

pub fn line_start(pos: &mut Position) {
    pos.col = 0;
}

/// First non-whitespace column of the line (0 for blank lines).
pub fn first_non_blank(buf: &Buffer, pos: &mut Position) {
    pos.col = buf
        .get(pos.line)
        .chars()
        .position(|c| !c.is_whitespace())
        .unwrap_or(0);
}

pub fn line_end(buf: &Buffer, pos: &mut Position, past_end: bool) {
    pos.col = last_col(buf, pos.line, past_end);
}

pub fn left(pos: &mut Position) {
    pos.col = pos.col.saturating_sub(1);
}

pub fn right(buf: &Buffer, pos: &mut Position, past_end: bool) {
    if pos.col < last_col(buf, pos.line, past_end) {
        pos.col += 1;
    }
}

/// Move up one line keeping the column where the target line allows it.
pub fn up(buf: &Buffer, pos: &mut Position, past_end: bool) {
    if pos.line == 0 {
        return;
    }
    pos.line -= 1;
    pos.col = pos.col.min(last_col(buf, pos.line, past_end));
}

/// Move down one line keeping the column where the target line allows it.
pub fn down(buf: &Buffer, pos: &mut Position, past_end: bool) {
    if pos.line >= buf.last_line() {
        return;
    }
    pos.line += 1;
    pos.col = pos.col.min(last_col(buf, pos.line, past_end));
}

/// Go to 1-based line `n`; `None` or an out-of-range number selects the last line.
pub fn goto_line(buf: &Buffer, pos: &mut Position, n: Option<usize>) {
    pos.line = match n {
        Some(n) if n >= 1 && n <= buf.line_count() => n - 1,
        Some(0) => 0,
        _ => buf.last_line(),
    };
    pos.col = 0;
}

/// Step one char in `dir`, skipping empty lines. `None` at either buffer boundary.
pub fn step_char(buf: &Buffer, pos: Position, dir: Direction) -> Option<Position> {
    match dir {
        Direction::Forward => {
            if pos.col + 1 < buf.line_len(pos.line) {
                return Some(Position::new(pos.line, pos.col + 1));
            }
            let mut row = pos.line + 1;
            while row < buf.line_count() && buf.line_len(row) == 0 {
                row += 1;
            }
            (row < buf.line_count()).then(|| Position::new(row, 0))
        }
        Direction::Backward => {
            if pos.col > 0 {
                return Some(Position::new(pos.line, pos.col - 1));
            }
            let mut row = pos.line;
            loop {
                if row == 0 {
                    return None;
                }
                row -= 1;
                let len = buf.line_len(row);
                if len > 0 {
                    return Some(Position::new(row, len - 1));
                }
            }
        }
    }
}

fn char_at(buf: &Buffer, pos: Position) -> Option<char> {
    buf.get(pos.line).chars().nth(pos.col)
}

fn bracket_partner(c: char) -> Option<(char, Direction)> {
    match c {
        '(' => Some((')', Direction::Forward)),
        '[' => Some((']', Direction::Forward)),
        '{' => Some(('}', Direction::Forward)),
        ')' => Some(('(', Direction::Backward)),
        ']' => Some(('[', Direction::Backward)),
        '}' => Some(('{', Direction::Backward)),
        _ => None,
    }
}

/// Whether the char under `pos` is one of `()[]{}`.
pub fn on_bracket(buf: &Buffer, pos: Position) -> bool {
    char_at(buf, pos).and_then(bracket_partner).is_some()
}

/// Find the bracket matching the one under `pos` (`%`). Only brackets of the same type
/// affect the depth count. `None` when `pos` is not on a bracket or no match exists.
pub fn bracket_match(buf: &Buffer, pos: Position) -> Option<Position> {
    let open = char_at(buf, pos)?;
    let (partner, dir) = bracket_partner(open)?;
    let mut depth = 1usize;
    let mut cur = pos;
    while let Some(next) = step_char(buf, cur, dir) {
        cur = next;
        match char_at(buf, cur) {
            Some(c) if c == open => depth += 1,
            Some(c) if c == partner => {
                depth -= 1;
                if depth == 0 {
                    return Some(cur);
                }
            }
            _ => {}
        }
    }
    None
}
