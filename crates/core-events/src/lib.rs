//! Core event types and channel helpers for rvi.
//!
//! The runtime funnels every external stimulus (keys, terminal resizes, status timer expiry)
//! through one bounded `tokio::sync::mpsc` channel of [`Event`]s. The consumer is the
//! synchronous main loop, which processes each event to completion before taking the next.

use std::fmt;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::Sender;
use tokio::task::JoinHandle;

/// Capacity of the main event channel. Producers park (`send().await`) when it is full
/// rather than dropping keys.
pub const EVENT_CHANNEL_CAP: usize = 1024;

/// Top-level event enum consumed by the central event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(InputEvent),
    /// The transient status message with this generation reached the end of its lifetime.
    StatusExpired(u64),
    Shutdown,
}

/// Normalized input events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Key(KeyEvent),
    /// Terminal resize (columns, rows).
    Resize(u16, u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyEvent {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// Unmodified key.
    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::empty())
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CTRL)
    }

    /// The character this key types, if it is a printable key without Ctrl/Alt.
    pub fn printable(&self) -> Option<char> {
        match self.code {
            KeyCode::Char(c)
                if !self.mods.intersects(KeyModifiers::CTRL | KeyModifiers::ALT)
                    && !c.is_control() =>
            {
                Some(c)
            }
            _ => None,
        }
    }

    pub fn is_ctrl(&self, c: char) -> bool {
        self.code == KeyCode::Char(c) && self.mods.contains(KeyModifiers::CTRL)
    }
}

/// KeyCode enumerates normalized logical key representations consumed by higher layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Esc,
    Backspace,
    Delete,
    Tab,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
}

bitflags::bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct KeyModifiers: u8 {
        const CTRL = 0b0000_0001;
        const ALT  = 0b0000_0010;
        const SHIFT= 0b0000_0100;
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}{:?}", self.code, self.mods)
    }
}

/// One-shot, cancellable timer that posts [`Event::StatusExpired`] after a delay.
///
/// Scheduling a new expiry aborts the previous one. The generation carried by the event
/// lets the consumer ignore an expiry that raced with a newer message.
pub struct StatusTimer {
    runtime: Handle,
    tx: Sender<Event>,
    pending: Option<JoinHandle<()>>,
}

impl StatusTimer {
    pub fn new(runtime: Handle, tx: Sender<Event>) -> Self {
        Self {
            runtime,
            tx,
            pending: None,
        }
    }

    pub fn schedule(&mut self, generation: u64, delay: Duration) {
        self.cancel();
        let tx = self.tx.clone();
        tracing::trace!(target: "runtime.timer", generation, delay_ms = delay.as_millis() as u64, "schedule status expiry");
        self.pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(Event::StatusExpired(generation)).await.is_err() {
                tracing::trace!(target: "runtime.timer", generation, "channel closed before expiry");
            }
        }));
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for StatusTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
