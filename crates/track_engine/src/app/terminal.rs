use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;
use thiserror::Error;
use tracing::{debug, warn};

use super::input::KeyEvent;
use super::key_source::{InputError, KeySource};

#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("failed to switch the terminal to raw input mode: {0}")]
    EnableRawMode(#[source] io::Error),
}

/// Keeps the terminal in unbuffered, no-echo mode until dropped.
#[derive(Debug)]
pub struct RawModeGuard {
    _private: (),
}

impl RawModeGuard {
    pub fn acquire() -> Result<Self, TerminalError> {
        terminal::enable_raw_mode().map_err(TerminalError::EnableRawMode)?;
        debug!("raw_mode_enabled");
        Ok(Self { _private: () })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        match terminal::disable_raw_mode() {
            Ok(()) => debug!("raw_mode_released"),
            Err(error) => warn!(error = %error, "raw_mode_release_failed"),
        }
    }
}

/// Key source backed by terminal events.
#[derive(Debug, Default)]
pub struct TerminalKeys;

impl TerminalKeys {
    pub fn new() -> Self {
        Self
    }
}

impl KeySource for TerminalKeys {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if !event::poll(remaining).map_err(InputError::Read)? {
                return Ok(None);
            }
            // Resize, mouse and key-release events do not count as input.
            if let Some(key) = translate_event(event::read().map_err(InputError::Read)?) {
                return Ok(Some(key));
            }
            if remaining.is_zero() {
                return Ok(None);
            }
        }
    }

    fn read_key(&mut self) -> Result<KeyEvent, InputError> {
        loop {
            if let Some(key) = translate_event(event::read().map_err(InputError::Read)?) {
                return Ok(key);
            }
        }
    }
}

fn translate_event(event: Event) -> Option<KeyEvent> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyEvent::Interrupt)
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(KeyEvent::EndOfInput)
        }
        KeyCode::Char(ch) => Some(KeyEvent::Char(ch)),
        _ => None,
    }
}
