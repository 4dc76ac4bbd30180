use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, warn};

use super::input::KeyEvent;
use super::key_source::{InputError, KeySource};

/// Session-wide running flag. Starts true and is cleared exactly once.
#[derive(Debug, Clone)]
pub struct RunFlag {
    running: Arc<AtomicBool>,
}

impl Default for RunFlag {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(true)),
        }
    }
}

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the flag. Returns `true` only for the call that performed the transition.
    pub fn stop(&self) -> bool {
        self.running
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

pub(crate) type InputMessage = Result<KeyEvent, InputError>;

#[derive(Debug)]
pub(crate) enum Received {
    Message(InputMessage),
    Timeout,
    Closed,
}

/// Background reader forwarding every key to the session loop.
///
/// The thread blocks in [`KeySource::read_key`] and is never cancelled; it
/// exits after forwarding a quit key or an error, when the receiving side is
/// gone, or when it finds the run flag cleared before its next read.
pub(crate) struct InputThread {
    receiver: Receiver<InputMessage>,
    flag: RunFlag,
    _handle: JoinHandle<()>,
}

impl InputThread {
    pub(crate) fn spawn<K>(keys: K, flag: RunFlag) -> io::Result<Self>
    where
        K: KeySource + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let thread_flag = flag.clone();
        let handle = thread::Builder::new()
            .name("input".to_string())
            .spawn(move || read_loop(keys, sender, thread_flag))?;
        debug!("input_thread_started");

        Ok(Self {
            receiver,
            flag,
            _handle: handle,
        })
    }

    /// Drains queued messages and returns the first read failure among them.
    pub(crate) fn pending_error(&self) -> Option<InputError> {
        self.receiver
            .try_iter()
            .find_map(|message| message.err())
    }

    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Received {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Received::Message(message),
            Err(RecvTimeoutError::Timeout) => Received::Timeout,
            Err(RecvTimeoutError::Disconnected) => Received::Closed,
        }
    }
}

impl Drop for InputThread {
    fn drop(&mut self) {
        // The reader may still be parked in a blocking read; it notices on its next wakeup.
        self.flag.stop();
    }
}

// A quit clears the flag before it is sent so the loop never renders past it.
// A failure is sent first so a cleared flag always has the error queued behind it.
fn read_loop<K: KeySource>(mut keys: K, sender: Sender<InputMessage>, flag: RunFlag) {
    while flag.is_running() {
        match keys.read_key() {
            Ok(key) if key.is_quit() => {
                flag.stop();
                let _ = sender.send(Ok(key));
                break;
            }
            Ok(key) => {
                if sender.send(Ok(key)).is_err() {
                    break;
                }
            }
            Err(error) => {
                warn!(error = %error, "input_read_failed");
                let _ = sender.send(Err(error));
                flag.stop();
                break;
            }
        }
    }
    debug!("input_thread_stopped");
}
