//! Display collaborator: the three primitives the renderer needs, plus two implementations.
//!
//! * [`CrosstermDisplay`] queues crossterm commands on any `Write` sink and emits them on
//!   `flush`, so a frame reaches the terminal in one write.
//! * [`MemoryDisplay`] keeps a grid of strings; used by tests and headless runs.
//!
//! Positions are absolute, (0, 0) origin; callers keep them in bounds.

use anyhow::Result;
use crossterm::{
    cursor::{MoveTo, Show},
    queue,
    style::Print,
    terminal::{Clear, ClearType},
};
use std::io::Write;

pub trait Display {
    fn move_cursor(&mut self, row: usize, col: usize) -> Result<()>;
    fn write(&mut self, row: usize, col: usize, text: &str) -> Result<()>;
    fn clear_line(&mut self, row: usize) -> Result<()>;
    /// Make everything queued so far visible.
    fn flush(&mut self) -> Result<()>;
}

fn coord(v: usize) -> u16 {
    u16::try_from(v).unwrap_or(u16::MAX)
}

pub struct CrosstermDisplay<W: Write> {
    out: W,
}

impl<W: Write> CrosstermDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for CrosstermDisplay<W> {
    fn move_cursor(&mut self, row: usize, col: usize) -> Result<()> {
        queue!(self.out, MoveTo(coord(col), coord(row)), Show)?;
        Ok(())
    }

    fn write(&mut self, row: usize, col: usize, text: &str) -> Result<()> {
        queue!(self.out, MoveTo(coord(col), coord(row)), Print(text))?;
        Ok(())
    }

    fn clear_line(&mut self, row: usize) -> Result<()> {
        queue!(self.out, MoveTo(0, coord(row)), Clear(ClearType::CurrentLine))?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// In-memory screen.
#[derive(Debug, Default, Clone)]
pub struct MemoryDisplay {
    rows: Vec<String>,
    cursor: (usize, usize),
    /// Number of `write` calls so far.
    pub writes: usize,
    /// Number of `flush` calls so far.
    pub flushes: usize,
}

impl MemoryDisplay {
    pub fn new(height: usize) -> Self {
        Self {
            rows: vec![String::new(); height],
            ..Self::default()
        }
    }

    pub fn row(&self, row: usize) -> &str {
        self.rows.get(row).map_or("", String::as_str)
    }

    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    pub fn cursor(&self) -> (usize, usize) {
        self.cursor
    }

    fn ensure_row(&mut self, row: usize) -> &mut String {
        if self.rows.len() <= row {
            self.rows.resize(row + 1, String::new());
        }
        &mut self.rows[row]
    }
}

impl Display for MemoryDisplay {
    fn move_cursor(&mut self, row: usize, col: usize) -> Result<()> {
        self.cursor = (row, col);
        Ok(())
    }

    fn write(&mut self, row: usize, col: usize, text: &str) -> Result<()> {
        self.writes += 1;
        let line = self.ensure_row(row);
        let mut chars: Vec<char> = line.chars().collect();
        if chars.len() < col {
            chars.resize(col, ' ');
        }
        for (i, c) in text.chars().enumerate() {
            match chars.get_mut(col + i) {
                Some(slot) => *slot = c,
                None => chars.push(c),
            }
        }
        *line = chars.into_iter().collect();
        Ok(())
    }

    fn clear_line(&mut self, row: usize) -> Result<()> {
        self.ensure_row(row).clear();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.flushes += 1;
        Ok(())
    }
}
