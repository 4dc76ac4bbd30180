use std::collections::VecDeque;
use std::io;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

use thiserror::Error;

use super::input::KeyEvent;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read terminal input: {0}")]
    Read(#[source] io::Error),
}

/// Capability to observe keys, either with a bounded wait or blocking.
pub trait KeySource {
    /// Waits at most `timeout` and consumes at most one key.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError>;

    /// Blocks until a key arrives. A closed stream yields [`KeyEvent::EndOfInput`].
    fn read_key(&mut self) -> Result<KeyEvent, InputError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptStep {
    Key(KeyEvent),
    /// One poll that times out without input.
    Idle,
}

/// Replays a fixed sequence of steps without waiting.
///
/// Once the script is exhausted, polls keep timing out and blocking reads
/// report end of input.
#[derive(Debug, Clone, Default)]
pub struct ScriptedKeys {
    steps: VecDeque<ScriptStep>,
}

impl ScriptedKeys {
    pub fn new(steps: impl IntoIterator<Item = ScriptStep>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }

    pub fn from_chars(keys: &str) -> Self {
        Self::new(keys.chars().map(|ch| ScriptStep::Key(KeyEvent::Char(ch))))
    }
}

impl KeySource for ScriptedKeys {
    fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        match self.steps.pop_front() {
            Some(ScriptStep::Key(key)) => Ok(Some(key)),
            Some(ScriptStep::Idle) | None => Ok(None),
        }
    }

    fn read_key(&mut self) -> Result<KeyEvent, InputError> {
        loop {
            match self.steps.pop_front() {
                Some(ScriptStep::Key(key)) => return Ok(key),
                Some(ScriptStep::Idle) => continue,
                None => return Ok(KeyEvent::EndOfInput),
            }
        }
    }
}

/// Keys pushed from another thread through a [`KeyFeeder`].
///
/// Dropping every feeder closes the stream.
#[derive(Debug)]
pub struct KeyFeed {
    receiver: Receiver<KeyEvent>,
}

#[derive(Debug, Clone)]
pub struct KeyFeeder {
    sender: Sender<KeyEvent>,
}

impl KeyFeed {
    pub fn channel() -> (KeyFeeder, KeyFeed) {
        let (sender, receiver) = mpsc::channel();
        (KeyFeeder { sender }, KeyFeed { receiver })
    }
}

impl KeyFeeder {
    /// Returns `false` once the feed has been dropped.
    pub fn press(&self, key: KeyEvent) -> bool {
        self.sender.send(key).is_ok()
    }

    pub fn press_char(&self, ch: char) -> bool {
        self.press(KeyEvent::Char(ch))
    }
}

impl KeySource for KeyFeed {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>, InputError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(key) => Ok(Some(key)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Ok(Some(KeyEvent::EndOfInput)),
        }
    }

    fn read_key(&mut self) -> Result<KeyEvent, InputError> {
        Ok(self.receiver.recv().unwrap_or(KeyEvent::EndOfInput))
    }
}
