//! Status row composition.
//!
//! Two stages: `compose_status` picks ordered `StatusSegment`s from the editor state and
//! `format_status` lays them out for a given width.
//!
//! * While the command line is active it owns the whole row.
//! * Otherwise the left side shows the transient message, or the mode label when there is
//!   none; the right side shows `<name>[*] <line>,<col>` (1-based) when it fits.

use core_state::{EditorState, Mode};
use core_text::{Position, char_len};
use std::borrow::Cow;
use std::path::Path;

/// What we need to render a status row.
pub struct StatusContext<'a> {
    pub mode: Mode,
    pub cursor: Position,
    /// Full command line text including its prefix; empty when inactive.
    pub command_line: &'a str,
    pub message: Option<&'a str>,
    pub file_name: Option<&'a Path>,
    pub dirty: bool,
}

impl<'a> StatusContext<'a> {
    pub fn from_state(state: &'a EditorState, cursor: Position) -> Self {
        Self {
            mode: state.mode,
            cursor,
            command_line: state.command_line.buffer(),
            message: state.status_message(),
            file_name: state.file_name.as_deref(),
            dirty: state.is_dirty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusSegment<'a> {
    CommandLine(&'a str),
    Message(&'a str),
    Mode(&'static str),
    /// File name with the dirty marker already applied.
    FileName(Cow<'a, str>),
    /// 1-based cursor line and column.
    Position { line_1: usize, col_1: usize },
}

pub fn compose_status<'a>(ctx: &StatusContext<'a>) -> Vec<StatusSegment<'a>> {
    if !ctx.command_line.is_empty() {
        return vec![StatusSegment::CommandLine(ctx.command_line)];
    }
    let mut out = Vec::with_capacity(3);
    out.push(match ctx.message {
        Some(msg) => StatusSegment::Message(msg),
        None => StatusSegment::Mode(ctx.mode.label()),
    });
    let name: Cow<'a, str> = match ctx.file_name {
        Some(p) => p.to_string_lossy(),
        None => Cow::Borrowed("[No Name]"),
    };
    out.push(StatusSegment::FileName(if ctx.dirty {
        Cow::Owned(format!("{name}*"))
    } else {
        name
    }));
    out.push(StatusSegment::Position {
        line_1: ctx.cursor.line + 1,
        col_1: ctx.cursor.col + 1,
    });
    out
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// Lay out `segments` in `width` columns. The right side is dropped when it does not fit.
pub fn format_status(segments: &[StatusSegment<'_>], width: usize) -> String {
    let mut left = String::new();
    let mut right: Vec<String> = Vec::new();
    for seg in segments {
        match seg {
            StatusSegment::CommandLine(text) => return truncate(text, width),
            StatusSegment::Message(text) => left.push_str(text),
            StatusSegment::Mode(label) => left.push_str(label),
            StatusSegment::FileName(name) => right.push(name.to_string()),
            StatusSegment::Position { line_1, col_1 } => right.push(format!("{line_1},{col_1}")),
        }
    }
    let right = right.join(" ");
    let (l, r) = (char_len(&left), char_len(&right));
    if r > 0 && l + 1 + r <= width {
        format!("{left}{}{right}", " ".repeat(width - l - r))
    } else {
        truncate(&left, width)
    }
}

pub fn build_status(ctx: &StatusContext<'_>, width: usize) -> String {
    format_status(&compose_status(ctx), width)
}
