#![allow(dead_code)] // Shared across integration tests; each test binary uses a subset of helpers.

use core_actions::{KeyTranslator, dispatch};
use core_events::{KeyCode, KeyEvent};
use core_model::EditorModel;
use core_state::EditorState;
use core_text::{Buffer, Position};

/// Parse a key script: plain chars plus `<Esc>`, `<CR>`, `<BS>`, `<Del>`, `<Tab>`,
/// `<Up>`, `<Down>`, `<Left>`, `<Right>`, `<Home>`, `<End>`, `<PageUp>`, `<PageDown>`
/// and `<C-x>` chords.
pub fn parse_keys(script: &str) -> Vec<KeyEvent> {
    let mut out = Vec::new();
    let mut rest = script;
    while let Some(c) = rest.chars().next() {
        if c == '<'
            && let Some(end) = rest.find('>')
            && end > 1
        {
            let name = &rest[1..end];
            let key = if let Some(ch) = name.strip_prefix("C-") {
                KeyEvent::ctrl(ch.chars().next().expect("ctrl chord char"))
            } else {
                KeyEvent::plain(match name {
                    "Esc" => KeyCode::Esc,
                    "CR" => KeyCode::Enter,
                    "BS" => KeyCode::Backspace,
                    "Del" => KeyCode::Delete,
                    "Tab" => KeyCode::Tab,
                    "Up" => KeyCode::Up,
                    "Down" => KeyCode::Down,
                    "Left" => KeyCode::Left,
                    "Right" => KeyCode::Right,
                    "Home" => KeyCode::Home,
                    "End" => KeyCode::End,
                    "PageUp" => KeyCode::PageUp,
                    "PageDown" => KeyCode::PageDown,
                    other => panic!("unknown key name <{other}>"),
                })
            };
            out.push(key);
            rest = &rest[end + 1..];
            continue;
        }
        out.push(KeyEvent::plain(KeyCode::Char(c)));
        rest = &rest[c.len_utf8()..];
    }
    out
}

/// Editor model plus translator, driven by key scripts.
pub struct Session {
    pub model: EditorModel,
    translator: KeyTranslator,
    pub quit: bool,
}

impl Session {
    pub fn new(text: &str) -> Self {
        Self::with_size(text, 80, 24)
    }

    pub fn with_size(text: &str, width: usize, height: usize) -> Self {
        let state = EditorState::new(Buffer::from_str("t", text).unwrap());
        Self {
            model: EditorModel::new(state, width, height),
            translator: KeyTranslator::new(),
            quit: false,
        }
    }

    pub fn from_state(state: EditorState) -> Self {
        Self {
            model: EditorModel::new(state, 80, 24),
            translator: KeyTranslator::new(),
            quit: false,
        }
    }

    pub fn keys(&mut self, script: &str) -> &mut Self {
        for key in parse_keys(script) {
            let mode = self.model.state().mode;
            if let Some(action) = self.translator.translate(mode, &key) {
                let result = dispatch(action, &mut self.model);
                self.quit |= result.quit;
            }
        }
        self
    }

    pub fn set_cursor(&mut self, line: usize, col: usize) -> &mut Self {
        self.model.view_mut().cursor = Position::new(line, col);
        self
    }

    pub fn lines(&self) -> Vec<String> {
        self.model.state().buffer.lines().to_vec()
    }

    pub fn text(&self) -> String {
        self.model.state().buffer.to_text()
    }

    pub fn cursor(&self) -> (usize, usize) {
        let c = self.model.cursor();
        (c.line, c.col)
    }

    pub fn status(&self) -> Option<&str> {
        self.model.state().status_message()
    }
}
