//! Action vocabulary, key translation, and dispatch.
//!
//! Keys flow through [`KeyTranslator`] (mode-aware, multi-key command recognition) into
//! [`Action`] values which [`dispatch`] applies to an [`core_model::EditorModel`].

use core_text::motion::Unit;

pub mod dispatcher;
pub mod error;
pub mod io_ops;
mod key_translator;

pub use dispatcher::{DispatchResult, dispatch};
pub use error::CommandError;
pub use key_translator::KeyTranslator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionKind {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    FirstNonBlank,
    LineEnd,
    PrevLineStart,
    NextLineStart,
    FirstLine,
    /// 1-based line number; `None` selects the last line.
    GotoLine(Option<usize>),
    NextStart(Unit),
    End(Unit),
    Start(Unit),
    BracketMatch,
    ScreenTop,
    ScreenMiddle,
    ScreenBottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollKind {
    PageDown,
    PageUp,
    LineDown,
    LineUp,
}

/// How a command-mode key enters insert mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertEntry {
    /// `i`
    Before,
    /// `I`
    FirstNonBlank,
    /// `a`
    After,
    /// `A`
    LineEnd,
    /// `o`
    OpenBelow,
    /// `O`
    OpenAbove,
    /// `s`
    Substitute,
    /// `S`
    SubstituteLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    InsertChar(char),
    InsertNewline,
    InsertTab,
    /// Insert-mode backspace (joins with the previous line at column 0).
    Backspace,
    /// `x` / Delete.
    DeleteUnder,
    /// `X`
    DeleteBefore,
    /// `dw` / `dW`
    DeleteWord(Unit),
    /// `dd`
    DeleteLine,
    /// `D`
    DeleteToEnd,
    /// `r<c>`
    ReplaceChar(char),
    /// `~`
    ToggleCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YankKind {
    Word(Unit),
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Motion(MotionKind),
    Scroll(ScrollKind),
    EnterInsert(InsertEntry),
    LeaveInsert,
    Edit(EditKind),
    Yank(YankKind),
    Paste { before: bool },
    Undo,
    Redo,
    RepeatLast,
    /// Open the command line with `:`, `/` or `?`.
    CommandStart(char),
    CommandChar(char),
    CommandBackspace,
    CommandCancel,
    CommandExecute,
    /// `n` (`reverse = false`) / `N`.
    SearchNext { reverse: bool },
}

impl Action {
    /// Variant name for logging (payloads may carry typed text and are not logged).
    pub fn label(&self) -> &'static str {
        match self {
            Action::Motion(_) => "motion",
            Action::Scroll(_) => "scroll",
            Action::EnterInsert(_) => "enter_insert",
            Action::LeaveInsert => "leave_insert",
            Action::Edit(_) => "edit",
            Action::Yank(_) => "yank",
            Action::Paste { .. } => "paste",
            Action::Undo => "undo",
            Action::Redo => "redo",
            Action::RepeatLast => "repeat",
            Action::CommandStart(_) => "command_start",
            Action::CommandChar(_) => "command_char",
            Action::CommandBackspace => "command_backspace",
            Action::CommandCancel => "command_cancel",
            Action::CommandExecute => "command_execute",
            Action::SearchNext { .. } => "search_next",
        }
    }
}
