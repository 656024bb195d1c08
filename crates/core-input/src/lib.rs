//! Async input service: crossterm's `EventStream` pumped by a Tokio task into the runtime's
//! event channel.
//!
//! Only key presses, key repeats and resizes are forwarded. Bracketed pastes arrive as
//! ordinary key events (one per char, `\n` as Enter) so the editor sees a paste exactly as if
//! it had been typed.

mod async_service;
pub use async_service::AsyncInputShutdown;

use async_service::spawn_async_event_task;

use core_events::{Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::event::{KeyCode as CKeyCode, KeyEvent as CKeyEvent, KeyModifiers as CMods};
use tokio::task::JoinHandle;

/// Spawn the async input service backed by `crossterm::EventStream`.
///
/// Returns the `JoinHandle` for the background task alongside a shutdown handle
/// that can be used to request immediate termination.
pub fn spawn_async_input(
    sender: tokio::sync::mpsc::Sender<Event>,
) -> (JoinHandle<()>, AsyncInputShutdown) {
    spawn_async_event_task(sender)
}

pub(crate) fn map_mods(m: CMods) -> KeyModifiers {
    let mut out = KeyModifiers::empty();
    if m.contains(CMods::CONTROL) {
        out |= KeyModifiers::CTRL;
    }
    if m.contains(CMods::ALT) {
        out |= KeyModifiers::ALT;
    }
    if m.contains(CMods::SHIFT) {
        out |= KeyModifiers::SHIFT;
    }
    out
}

pub(crate) fn map_code(code: CKeyCode) -> Option<KeyCode> {
    Some(match code {
        CKeyCode::Char(c) => KeyCode::Char(c),
        CKeyCode::Enter => KeyCode::Enter,
        CKeyCode::Esc => KeyCode::Esc,
        CKeyCode::Backspace => KeyCode::Backspace,
        CKeyCode::Delete => KeyCode::Delete,
        CKeyCode::Tab => KeyCode::Tab,
        CKeyCode::Up => KeyCode::Up,
        CKeyCode::Down => KeyCode::Down,
        CKeyCode::Left => KeyCode::Left,
        CKeyCode::Right => KeyCode::Right,
        CKeyCode::Home => KeyCode::Home,
        CKeyCode::End => KeyCode::End,
        CKeyCode::PageUp => KeyCode::PageUp,
        CKeyCode::PageDown => KeyCode::PageDown,
        _ => return None,
    })
}

/// Normalized form of a crossterm key event, `None` for keys the editor has no use for.
pub fn map_key_event(key: &CKeyEvent) -> Option<KeyEvent> {
    let code = map_code(key.code)?;
    Some(KeyEvent::new(code, map_mods(key.modifiers)))
}

/// Key events equivalent to typing `text`.
pub fn paste_keys(text: &str) -> impl Iterator<Item = KeyEvent> + '_ {
    text.chars().filter(|&c| c != '\r').map(|c| match c {
        '\n' => KeyEvent::plain(KeyCode::Enter),
        '\t' => KeyEvent::plain(KeyCode::Tab),
        c => KeyEvent::plain(KeyCode::Char(c)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_ctrl_chord() {
        let k = CKeyEvent::new(CKeyCode::Char('r'), CMods::CONTROL);
        assert_eq!(map_key_event(&k), Some(KeyEvent::ctrl('r')));
    }

    #[test]
    fn maps_shifted_letter() {
        let k = CKeyEvent::new(CKeyCode::Char('G'), CMods::SHIFT);
        let ev = map_key_event(&k).unwrap();
        assert_eq!(ev.printable(), Some('G'));
    }

    #[test]
    fn ignores_function_keys() {
        let k = CKeyEvent::new(CKeyCode::F(5), CMods::NONE);
        assert_eq!(map_key_event(&k), None);
    }

    #[test]
    fn paste_becomes_typed_keys() {
        let keys: Vec<_> = paste_keys("a\r\nb").collect();
        assert_eq!(
            keys,
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Enter),
                KeyEvent::plain(KeyCode::Char('b')),
            ]
        );
    }
}
