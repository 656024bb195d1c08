//! KeyTranslator: stateful key -> Action translation.
//!
//! Command mode recognizes multi-key commands with a *partial* accumulator. Every printable
//! key is appended, then the accumulator is matched against a table of command suffixes
//! ordered longest first, so `dw` wins over `w` and `gg` over a lone `g`. A match clears the
//! accumulator; an unmatched key simply stays in it, which is how a half-typed gesture such
//! as `d` followed by `j` degrades into the plain `j` motion.
//!
//! Special forms checked before the table:
//! * `r<c>`: the key after `r` is the replacement char, whatever it is.
//! * `[N]G`: the run of digits just before `G` is the target line.
//! * `0`: line start, unless it continues a digit run (`10G`).
//!
//! Non-printable keys (arrows, control chords, Backspace, Delete, ...) always clear the
//! accumulator and are looked up in a separate fixed table.

use crate::{Action, EditKind, InsertEntry, MotionKind, ScrollKind, YankKind};
use core_events::{KeyCode, KeyEvent};
use core_state::Mode;
use core_text::motion::Unit;

/// Accumulator cap; only the tail matters for suffix matching.
const PARTIAL_MAX: usize = 32;

const COMMAND_TABLE: &[(&str, Action)] = &[
    ("gg", Action::Motion(MotionKind::FirstLine)),
    ("dw", Action::Edit(EditKind::DeleteWord(Unit::Word))),
    ("dW", Action::Edit(EditKind::DeleteWord(Unit::Term))),
    ("yw", Action::Yank(YankKind::Word(Unit::Word))),
    ("yW", Action::Yank(YankKind::Word(Unit::Term))),
    ("dd", Action::Edit(EditKind::DeleteLine)),
    ("yy", Action::Yank(YankKind::Line)),
    ("i", Action::EnterInsert(InsertEntry::Before)),
    ("I", Action::EnterInsert(InsertEntry::FirstNonBlank)),
    ("a", Action::EnterInsert(InsertEntry::After)),
    ("A", Action::EnterInsert(InsertEntry::LineEnd)),
    ("o", Action::EnterInsert(InsertEntry::OpenBelow)),
    ("O", Action::EnterInsert(InsertEntry::OpenAbove)),
    ("s", Action::EnterInsert(InsertEntry::Substitute)),
    ("S", Action::EnterInsert(InsertEntry::SubstituteLine)),
    ("D", Action::Edit(EditKind::DeleteToEnd)),
    ("u", Action::Undo),
    (".", Action::RepeatLast),
    ("^", Action::Motion(MotionKind::FirstNonBlank)),
    ("$", Action::Motion(MotionKind::LineEnd)),
    ("-", Action::Motion(MotionKind::PrevLineStart)),
    ("+", Action::Motion(MotionKind::NextLineStart)),
    ("H", Action::Motion(MotionKind::ScreenTop)),
    ("M", Action::Motion(MotionKind::ScreenMiddle)),
    ("L", Action::Motion(MotionKind::ScreenBottom)),
    ("w", Action::Motion(MotionKind::NextStart(Unit::Word))),
    ("W", Action::Motion(MotionKind::NextStart(Unit::Term))),
    ("e", Action::Motion(MotionKind::End(Unit::Word))),
    ("E", Action::Motion(MotionKind::End(Unit::Term))),
    ("b", Action::Motion(MotionKind::Start(Unit::Word))),
    ("B", Action::Motion(MotionKind::Start(Unit::Term))),
    (":", Action::CommandStart(':')),
    ("/", Action::CommandStart('/')),
    ("?", Action::CommandStart('?')),
    ("~", Action::Edit(EditKind::ToggleCase)),
    ("x", Action::Edit(EditKind::DeleteUnder)),
    ("X", Action::Edit(EditKind::DeleteBefore)),
    ("%", Action::Motion(MotionKind::BracketMatch)),
    ("n", Action::SearchNext { reverse: false }),
    ("N", Action::SearchNext { reverse: true }),
    ("Y", Action::Yank(YankKind::Line)),
    ("p", Action::Paste { before: false }),
    ("P", Action::Paste { before: true }),
    ("h", Action::Motion(MotionKind::Left)),
    ("j", Action::Motion(MotionKind::Down)),
    ("k", Action::Motion(MotionKind::Up)),
    ("l", Action::Motion(MotionKind::Right)),
];

#[derive(Debug, Default)]
pub struct KeyTranslator {
    partial: String,
}

impl KeyTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys typed so far toward an unfinished command.
    pub fn partial(&self) -> &str {
        &self.partial
    }

    pub fn reset(&mut self) {
        self.partial.clear();
    }

    pub fn translate(&mut self, mode: Mode, key: &KeyEvent) -> Option<Action> {
        match mode {
            Mode::Command => self.translate_command(key),
            Mode::Insert => {
                self.reset();
                translate_insert(key)
            }
            Mode::CommandLine => {
                self.reset();
                translate_command_line(key)
            }
        }
    }

    fn translate_command(&mut self, key: &KeyEvent) -> Option<Action> {
        let Some(c) = key.printable() else {
            self.reset();
            return translate_special(key);
        };
        let awaiting_replacement = self.partial.ends_with('r');
        let continues_count = self.partial.ends_with(|p: char| p.is_ascii_digit());
        self.partial.push(c);
        if self.partial.len() > PARTIAL_MAX {
            let cut = self.partial.len() - PARTIAL_MAX;
            let cut = (cut..self.partial.len())
                .find(|i| self.partial.is_char_boundary(*i))
                .unwrap_or(0);
            self.partial.drain(..cut);
        }

        let action = if awaiting_replacement {
            Some(Action::Edit(EditKind::ReplaceChar(c)))
        } else if c == 'r' || (c.is_ascii_digit() && (c != '0' || continues_count)) {
            None
        } else if c == '0' {
            Some(Action::Motion(MotionKind::LineStart))
        } else if c == 'G' {
            Some(Action::Motion(MotionKind::GotoLine(self.trailing_count())))
        } else {
            COMMAND_TABLE
                .iter()
                .find(|(suffix, _)| self.partial.ends_with(suffix))
                .map(|(_, action)| *action)
        };
        if action.is_some() {
            tracing::trace!(target: "actions.translate", partial_len = self.partial.len(), "command_matched");
            self.reset();
        }
        action
    }

    /// Digits immediately before the final key.
    fn trailing_count(&self) -> Option<usize> {
        let head = &self.partial[..self.partial.len() - 1];
        let digits: String = head
            .chars()
            .rev()
            .take_while(|c| c.is_ascii_digit())
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        digits.parse().ok()
    }
}

fn translate_special(key: &KeyEvent) -> Option<Action> {
    if key.is_ctrl('r') {
        return Some(Action::Redo);
    }
    if key.is_ctrl('f') {
        return Some(Action::Scroll(ScrollKind::PageDown));
    }
    if key.is_ctrl('b') {
        return Some(Action::Scroll(ScrollKind::PageUp));
    }
    if key.is_ctrl('e') {
        return Some(Action::Scroll(ScrollKind::LineDown));
    }
    if key.is_ctrl('y') {
        return Some(Action::Scroll(ScrollKind::LineUp));
    }
    match key.code {
        KeyCode::PageDown => Some(Action::Scroll(ScrollKind::PageDown)),
        KeyCode::PageUp => Some(Action::Scroll(ScrollKind::PageUp)),
        KeyCode::Delete => Some(Action::Edit(EditKind::DeleteUnder)),
        KeyCode::Backspace | KeyCode::Left => Some(Action::Motion(MotionKind::Left)),
        KeyCode::Right => Some(Action::Motion(MotionKind::Right)),
        KeyCode::Up => Some(Action::Motion(MotionKind::Up)),
        KeyCode::Down => Some(Action::Motion(MotionKind::Down)),
        KeyCode::Home => Some(Action::Motion(MotionKind::LineStart)),
        KeyCode::End => Some(Action::Motion(MotionKind::LineEnd)),
        _ => None,
    }
}

fn translate_insert(key: &KeyEvent) -> Option<Action> {
    if key.is_ctrl('c') {
        return Some(Action::LeaveInsert);
    }
    if let Some(c) = key.printable() {
        return Some(Action::Edit(EditKind::InsertChar(c)));
    }
    match key.code {
        KeyCode::Esc => Some(Action::LeaveInsert),
        KeyCode::Enter => Some(Action::Edit(EditKind::InsertNewline)),
        KeyCode::Tab => Some(Action::Edit(EditKind::InsertTab)),
        KeyCode::Backspace => Some(Action::Edit(EditKind::Backspace)),
        KeyCode::Delete => Some(Action::Edit(EditKind::DeleteUnder)),
        KeyCode::Left => Some(Action::Motion(MotionKind::Left)),
        KeyCode::Right => Some(Action::Motion(MotionKind::Right)),
        KeyCode::Up => Some(Action::Motion(MotionKind::Up)),
        KeyCode::Down => Some(Action::Motion(MotionKind::Down)),
        KeyCode::Home => Some(Action::Motion(MotionKind::LineStart)),
        KeyCode::End => Some(Action::Motion(MotionKind::LineEnd)),
        _ => None,
    }
}

fn translate_command_line(key: &KeyEvent) -> Option<Action> {
    if key.is_ctrl('c') {
        return Some(Action::CommandCancel);
    }
    if let Some(c) = key.printable() {
        return Some(Action::CommandChar(c));
    }
    match key.code {
        KeyCode::Esc => Some(Action::CommandCancel),
        KeyCode::Enter => Some(Action::CommandExecute),
        KeyCode::Backspace => Some(Action::CommandBackspace),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_events::KeyModifiers;

    fn feed(t: &mut KeyTranslator, keys: &str) -> Vec<Action> {
        keys.chars()
            .filter_map(|c| t.translate(Mode::Command, &KeyEvent::plain(KeyCode::Char(c))))
            .collect()
    }

    #[test]
    fn two_key_commands_beat_single_keys() {
        let mut t = KeyTranslator::new();
        assert_eq!(feed(&mut t, "dw"), vec![Action::Edit(EditKind::DeleteWord(Unit::Word))]);
        assert_eq!(feed(&mut t, "dd"), vec![Action::Edit(EditKind::DeleteLine)]);
        assert_eq!(feed(&mut t, "gg"), vec![Action::Motion(MotionKind::FirstLine)]);
        assert_eq!(feed(&mut t, "yy"), vec![Action::Yank(YankKind::Line)]);
    }

    #[test]
    fn unfinished_gesture_degrades_to_plain_motion() {
        let mut t = KeyTranslator::new();
        assert_eq!(feed(&mut t, "dj"), vec![Action::Motion(MotionKind::Down)]);
        assert_eq!(t.partial(), "");
    }

    #[test]
    fn count_before_goto() {
        let mut t = KeyTranslator::new();
        assert_eq!(feed(&mut t, "12G"), vec![Action::Motion(MotionKind::GotoLine(Some(12)))]);
        assert_eq!(feed(&mut t, "G"), vec![Action::Motion(MotionKind::GotoLine(None))]);
        assert_eq!(feed(&mut t, "10G"), vec![Action::Motion(MotionKind::GotoLine(Some(10)))]);
        assert_eq!(feed(&mut t, "0"), vec![Action::Motion(MotionKind::LineStart)]);
    }

    #[test]
    fn replace_reads_one_extra_key() {
        let mut t = KeyTranslator::new();
        assert_eq!(feed(&mut t, "rx"), vec![Action::Edit(EditKind::ReplaceChar('x'))]);
        assert_eq!(feed(&mut t, "rr"), vec![Action::Edit(EditKind::ReplaceChar('r'))]);
        assert_eq!(feed(&mut t, "r0"), vec![Action::Edit(EditKind::ReplaceChar('0'))]);
    }

    #[test]
    fn special_key_resets_partial() {
        let mut t = KeyTranslator::new();
        assert!(feed(&mut t, "d").is_empty());
        assert_eq!(
            t.translate(Mode::Command, &KeyEvent::plain(KeyCode::Down)),
            Some(Action::Motion(MotionKind::Down))
        );
        assert_eq!(t.partial(), "");
        assert_eq!(feed(&mut t, "w"), vec![Action::Motion(MotionKind::NextStart(Unit::Word))]);
        assert_eq!(t.translate(Mode::Command, &KeyEvent::ctrl('r')), Some(Action::Redo));
        assert_eq!(
            t.translate(Mode::Command, &KeyEvent::plain(KeyCode::Esc)),
            None
        );
    }

    #[test]
    fn insert_and_command_line_keys() {
        let mut t = KeyTranslator::new();
        assert_eq!(
            t.translate(Mode::Insert, &KeyEvent::new(KeyCode::Char('Q'), KeyModifiers::SHIFT)),
            Some(Action::Edit(EditKind::InsertChar('Q')))
        );
        assert_eq!(t.translate(Mode::Insert, &KeyEvent::ctrl('c')), Some(Action::LeaveInsert));
        assert_eq!(
            t.translate(Mode::CommandLine, &KeyEvent::plain(KeyCode::Enter)),
            Some(Action::CommandExecute)
        );
        assert_eq!(
            t.translate(Mode::CommandLine, &KeyEvent::plain(KeyCode::Char('q'))),
            Some(Action::CommandChar('q'))
        );
    }
}
