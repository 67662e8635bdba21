//! Composer: the message input box.
//!
//! Holds the draft text and turns key presses into actions. Submitting
//! hands the trimmed draft to the session; Stop goes through the shared
//! [`StopHandle`] so it works while the session is busy in `send`.

use crate::reducer::StopHandle;

pub const MIN_ROWS: usize = 1;
pub const MAX_ROWS: usize = 8;
pub const PLACEHOLDER: &str = "Type a message…";
pub const HINT: &str = "Enter to send • Shift+Enter for newline";

/// What a key press asks the caller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Send this text.
    Submit(String),
    /// A newline was inserted into the draft.
    Newline,
    /// Enter was pressed but nothing can be sent right now.
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Composer {
    input: String,
    stop: StopHandle,
}

impl Composer {
    /// A composer wired to the session's stop handle.
    #[must_use]
    pub fn new(stop: StopHandle) -> Self {
        Self { input: String::new(), stop }
    }

    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Textarea height: one row per line, clamped to 1..=8.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.input.split('\n').count().clamp(MIN_ROWS, MAX_ROWS)
    }

    #[must_use]
    pub fn can_send(&self, in_flight: bool) -> bool {
        !in_flight && !self.input.trim().is_empty()
    }

    /// The stop control is live only while a reply is in flight.
    #[must_use]
    pub fn can_stop(&self) -> bool {
        self.stop.is_armed()
    }

    /// Enter submits; Shift+Enter inserts a newline.
    pub fn on_enter(&mut self, shift: bool, in_flight: bool) -> KeyAction {
        if shift {
            self.input.push('\n');
            return KeyAction::Newline;
        }
        match self.submit(in_flight) {
            Some(text) => KeyAction::Submit(text),
            None => KeyAction::Ignored,
        }
    }

    /// Take the trimmed draft, clearing the input. `None` when sending is
    /// not allowed; the draft is then left untouched.
    pub fn submit(&mut self, in_flight: bool) -> Option<String> {
        if !self.can_send(in_flight) {
            return None;
        }
        let text = self.input.trim().to_owned();
        self.input.clear();
        Some(text)
    }

    /// Abort the in-flight reply, if any.
    pub fn stop(&self) -> bool {
        self.stop.stop()
    }
}

#[cfg(test)]
#[path = "composer_test.rs"]
mod tests;
