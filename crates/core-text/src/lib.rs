//! Line-oriented text buffer abstraction.
//!
//! The buffer is an ordered sequence of independently resizable lines and is the
//! ground truth of document state. Columns are `char` offsets into a line; no
//! grapheme or display-width arithmetic happens at this layer.
//!
//! Invariant: the buffer is never empty. Removing the last remaining line leaves a
//! single empty line behind.

use anyhow::Result;

pub mod motion;
pub mod search;

/// A text buffer backed by a vector of lines (no trailing newlines stored).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Buffer {
    lines: Vec<String>,
    pub name: String,
    /// Bumped on every mutation; consumers cache derived data against it.
    revision: u64,
}

/// A position inside a buffer expressed as (line index, char column within that line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
    pub fn origin() -> Self {
        Self { line: 0, col: 0 }
    }
    pub fn clamp_to<F>(&mut self, line_count: usize, mut line_len_fn: F)
    where
        F: FnMut(usize) -> usize,
    {
        if line_count == 0 {
            self.line = 0;
            self.col = 0;
            return;
        }
        if self.line >= line_count {
            self.line = line_count - 1;
        }
        let max_len = line_len_fn(self.line);
        if self.col > max_len {
            self.col = max_len;
        }
    }
}

/// Scan direction shared by motions and search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn reversed(self) -> Self {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
    pub(crate) fn step(self) -> isize {
        match self {
            Direction::Forward => 1,
            Direction::Backward => -1,
        }
    }
}

/// Byte offset of char column `col` in `s` (clamped to `s.len()`).
pub fn byte_of(s: &str, col: usize) -> usize {
    s.char_indices().nth(col).map(|(b, _)| b).unwrap_or(s.len())
}

/// Char column of byte offset `byte` in `s`.
pub fn col_of(s: &str, byte: usize) -> usize {
    s[..byte.min(s.len())].chars().count()
}

/// Number of chars in `s`.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Substring by char columns `[start, end)`, clamped to the line.
pub fn slice_cols(s: &str, start: usize, end: usize) -> &str {
    let b0 = byte_of(s, start);
    let b1 = byte_of(s, end.max(start));
    &s[b0..b1]
}

impl Buffer {
    /// Construct a buffer from an in-memory string slice (LF line breaks).
    pub fn from_str(name: impl Into<String>, content: &str) -> Result<Self> {
        let lines = if content.is_empty() {
            vec![String::new()]
        } else {
            let body = content.strip_suffix('\n').unwrap_or(content);
            body.split('\n').map(str::to_string).collect()
        };
        Ok(Self::from_lines(name, lines))
    }

    /// Construct a buffer from already split lines.
    pub fn from_lines(name: impl Into<String>, mut lines: Vec<String>) -> Self {
        if lines.is_empty() {
            lines.push(String::new());
        }
        Self {
            lines,
            name: name.into(),
            revision: 0,
        }
    }

    /// Total number of lines in the buffer (always >= 1).
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Return the requested line, if present.
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// Return the requested line or the empty string when out of range.
    pub fn get(&self, row: usize) -> &str {
        self.line(row).unwrap_or("")
    }

    /// Length of a line in chars (0 when out of range).
    pub fn line_len(&self, row: usize) -> usize {
        self.line(row).map(char_len).unwrap_or(0)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Index of the last line.
    pub fn last_line(&self) -> usize {
        self.lines.len() - 1
    }

    /// Replace the content of `row`.
    pub fn set(&mut self, row: usize, text: impl Into<String>) {
        if let Some(slot) = self.lines.get_mut(row) {
            *slot = text.into();
            self.revision += 1;
        }
    }

    /// Insert a new line so that it becomes `row` (row == line_count appends).
    pub fn insert_line(&mut self, row: usize, text: impl Into<String>) {
        let row = row.min(self.lines.len());
        self.lines.insert(row, text.into());
        self.revision += 1;
    }

    /// Remove `row`, returning its content. The last remaining line is cleared instead.
    pub fn delete_line(&mut self, row: usize) -> Option<String> {
        if row >= self.lines.len() {
            return None;
        }
        let removed = if self.lines.len() == 1 {
            std::mem::take(&mut self.lines[0])
        } else {
            self.lines.remove(row)
        };
        self.revision += 1;
        Some(removed)
    }

    /// Replace `count` lines starting at `row` with `replacement`, returning the removed lines.
    /// The never-empty invariant is restored if the splice leaves no lines.
    pub fn splice_lines(
        &mut self,
        row: usize,
        count: usize,
        replacement: Vec<String>,
    ) -> Vec<String> {
        let start = row.min(self.lines.len());
        let end = (start + count).min(self.lines.len());
        let removed: Vec<String> = self.lines.splice(start..end, replacement).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.revision += 1;
        removed
    }

    /// Text between two positions (`from` inclusive, `to` exclusive), joined with `\n`.
    pub fn text_between(&self, from: Position, to: Position) -> String {
        if to <= from {
            return String::new();
        }
        if from.line == to.line {
            return slice_cols(self.get(from.line), from.col, to.col).to_string();
        }
        let mut out = String::new();
        let first = self.get(from.line);
        out.push_str(slice_cols(first, from.col, char_len(first)));
        for row in from.line + 1..to.line.min(self.line_count()) {
            out.push('\n');
            out.push_str(self.get(row));
        }
        if to.line < self.line_count() {
            out.push('\n');
            out.push_str(slice_cols(self.get(to.line), 0, to.col));
        }
        out
    }

    /// Serialize with `\n` separators (no trailing newline).
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}
