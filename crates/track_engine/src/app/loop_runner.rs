use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use thiserror::Error;
use tracing::{debug, info};

use crate::track::{Frame, TrackError, TrackReader, TrackWriter};

use super::clock::FrameClock;
use super::config::{Concurrency, SessionConfig};
use super::input::{EditorCommand, PlayerCommand};
use super::input_thread::{InputThread, Received, RunFlag};
use super::key_source::{InputError, KeySource};
use super::metrics::{FrameStats, FrameStatsSnapshot};
use super::renderer::LineRenderer;
use super::state::{EditorState, PlayerState, SessionOutcome, Verdict};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to start the input thread: {0}")]
    InputThreadSpawn(#[source] io::Error),
    #[error("failed to draw the track: {0}")]
    Render(#[source] io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionReport {
    pub outcome: SessionOutcome,
    /// Frames written by the editor, or frames consumed by the player.
    pub track_frames: usize,
    pub stats: FrameStatsSnapshot,
}

/// Records a track: every cycle renders the margins and appends them to `track`.
///
/// Ends only on a quit key or end of input; the margins current at that
/// point are not written again.
pub fn run_editor<K, T, O>(
    config: &SessionConfig,
    keys: K,
    track: &mut TrackWriter<T>,
    out: &mut O,
) -> Result<SessionReport, SessionError>
where
    K: KeySource + Send + 'static,
    T: Write,
    O: Write,
{
    let mut state = EditorState::from_header(track.header())?;
    let mut screen = Screen::new(LineRenderer::new(state.geometry()), out);
    log_session_start(config, "editor");

    let outcome = match config.concurrency {
        Concurrency::Cooperative => {
            editor_cooperative(config.frame_budget, keys, &mut state, track, &mut screen)?
        }
        Concurrency::Threaded => {
            editor_threaded(config.frame_budget, keys, &mut state, track, &mut screen)?
        }
    };

    Ok(finish(outcome, track.frames_written(), &screen.stats))
}

/// Replays `track` while the player steers. Ends on goal, crash or quit.
pub fn run_player<K, R, O>(
    config: &SessionConfig,
    keys: K,
    track: &mut TrackReader<R>,
    out: &mut O,
) -> Result<SessionReport, SessionError>
where
    K: KeySource + Send + 'static,
    R: BufRead,
    O: Write,
{
    let mut player = PlayerState::new(track.header().start_pos, config.move_latch);
    let mut screen = Screen::new(LineRenderer::new(track.geometry()), out);
    log_session_start(config, "player");

    let outcome = match config.concurrency {
        Concurrency::Cooperative => {
            player_cooperative(config.frame_budget, keys, &mut player, track, &mut screen)?
        }
        Concurrency::Threaded => {
            player_threaded(config.frame_budget, keys, &mut player, track, &mut screen)?
        }
    };

    Ok(finish(outcome, track.frames_read(), &screen.stats))
}

fn editor_cooperative<K, T, O>(
    budget: Duration,
    mut keys: K,
    state: &mut EditorState,
    track: &mut TrackWriter<T>,
    screen: &mut Screen<'_, O>,
) -> Result<SessionOutcome, SessionError>
where
    K: KeySource,
    T: Write,
    O: Write,
{
    loop {
        // The bounded wait is the frame delay; at most one key per frame.
        if let Some(key) = keys.poll_key(budget)? {
            match EditorCommand::decode(key) {
                Some(EditorCommand::Quit) => return Ok(SessionOutcome::Quit),
                Some(command) => screen.stats.record_key(state.apply(command)),
                None => screen.stats.record_key(false),
            }
        }
        screen.margins(state.frame())?;
        track.write_frame(state.frame())?;
    }
}

fn editor_threaded<K, T, O>(
    budget: Duration,
    keys: K,
    state: &mut EditorState,
    track: &mut TrackWriter<T>,
    screen: &mut Screen<'_, O>,
) -> Result<SessionOutcome, SessionError>
where
    K: KeySource + Send + 'static,
    T: Write,
    O: Write,
{
    let flag = RunFlag::new();
    let input = InputThread::spawn(keys, flag.clone()).map_err(SessionError::InputThreadSpawn)?;
    let mut clock = FrameClock::new(budget, Instant::now());

    loop {
        if !flag.is_running() {
            return stopped(&input);
        }
        clock.start_frame(Instant::now());
        screen.margins(state.frame())?;
        track.write_frame(state.frame())?;

        // Sleep out the frame, applying keys the moment they arrive.
        while let Some(remaining) = clock.remaining(Instant::now()) {
            match input.recv_timeout(remaining) {
                Received::Message(Ok(key)) => match EditorCommand::decode(key) {
                    Some(EditorCommand::Quit) => break,
                    Some(command) => screen.stats.record_key(state.apply(command)),
                    None => screen.stats.record_key(false),
                },
                Received::Message(Err(error)) => return Err(error.into()),
                Received::Timeout => break,
                Received::Closed => {
                    flag.stop();
                    break;
                }
            }
        }
    }
}

fn player_cooperative<K, R, O>(
    budget: Duration,
    mut keys: K,
    player: &mut PlayerState,
    track: &mut TrackReader<R>,
    screen: &mut Screen<'_, O>,
) -> Result<SessionOutcome, SessionError>
where
    K: KeySource,
    R: BufRead,
    O: Write,
{
    loop {
        let Some(frame) = track.next_frame()? else {
            return Ok(SessionOutcome::Goal);
        };
        player.begin_frame();

        if let Some(key) = keys.poll_key(budget)? {
            match PlayerCommand::decode(key) {
                Some(PlayerCommand::Quit) => return Ok(SessionOutcome::Quit),
                Some(command) => screen.stats.record_key(player.steer(command)),
                None => screen.stats.record_key(false),
            }
        }

        if let Some(outcome) = screen.player_frame(frame, player, track.frames_read())? {
            return Ok(outcome);
        }
    }
}

fn player_threaded<K, R, O>(
    budget: Duration,
    keys: K,
    player: &mut PlayerState,
    track: &mut TrackReader<R>,
    screen: &mut Screen<'_, O>,
) -> Result<SessionOutcome, SessionError>
where
    K: KeySource + Send + 'static,
    R: BufRead,
    O: Write,
{
    let flag = RunFlag::new();
    let input = InputThread::spawn(keys, flag.clone()).map_err(SessionError::InputThreadSpawn)?;
    let mut clock = FrameClock::new(budget, Instant::now());

    loop {
        if !flag.is_running() {
            return stopped(&input);
        }
        let Some(frame) = track.next_frame()? else {
            return Ok(SessionOutcome::Goal);
        };
        clock.start_frame(Instant::now());
        player.begin_frame();

        // The frame advances only once its target duration has elapsed.
        while let Some(remaining) = clock.remaining(Instant::now()) {
            match input.recv_timeout(remaining) {
                Received::Message(Ok(key)) => match PlayerCommand::decode(key) {
                    Some(PlayerCommand::Quit) => return Ok(SessionOutcome::Quit),
                    Some(command) => screen.stats.record_key(player.steer(command)),
                    None => screen.stats.record_key(false),
                },
                Received::Message(Err(error)) => return Err(error.into()),
                Received::Timeout => break,
                Received::Closed => {
                    flag.stop();
                    return Ok(SessionOutcome::Quit);
                }
            }
        }

        if let Some(outcome) = screen.player_frame(frame, player, track.frames_read())? {
            return Ok(outcome);
        }
    }
}

// The flag also clears after a read failure; that failure wins over a quiet quit.
fn stopped(input: &InputThread) -> Result<SessionOutcome, SessionError> {
    match input.pending_error() {
        Some(error) => Err(error.into()),
        None => Ok(SessionOutcome::Quit),
    }
}

struct Screen<'o, O> {
    renderer: LineRenderer,
    out: &'o mut O,
    stats: FrameStats,
}

impl<'o, O: Write> Screen<'o, O> {
    fn new(renderer: LineRenderer, out: &'o mut O) -> Self {
        Self {
            renderer,
            out,
            stats: FrameStats::new(),
        }
    }

    fn margins(&mut self, frame: Frame) -> Result<(), SessionError> {
        self.renderer
            .draw_margins(frame, &mut *self.out)
            .map_err(SessionError::Render)?;
        self.stats.record_frame(Instant::now());
        Ok(())
    }

    /// Draws one play cycle; on a crash also draws the crash line and reports the outcome.
    fn player_frame(
        &mut self,
        frame: Frame,
        player: &PlayerState,
        frame_index: usize,
    ) -> Result<Option<SessionOutcome>, SessionError> {
        let xpos = player.xpos();
        self.renderer
            .draw_player(frame, xpos, false, &mut *self.out)
            .map_err(SessionError::Render)?;
        self.stats.record_frame(Instant::now());

        if player.evaluate(frame) == Verdict::OnTrack {
            return Ok(None);
        }
        debug!(frame = frame_index, xpos, left = frame.left, right = frame.right, "crash_detected");
        self.renderer
            .draw_player(frame, xpos, true, &mut *self.out)
            .map_err(SessionError::Render)?;
        Ok(Some(SessionOutcome::Crash {
            frame: frame_index,
            xpos,
        }))
    }
}

fn log_session_start(config: &SessionConfig, role: &'static str) {
    info!(
        role,
        concurrency = ?config.concurrency,
        frame_budget_ms = config.frame_budget.as_millis() as u64,
        move_latch = config.move_latch,
        "session_started"
    );
}

fn finish(outcome: SessionOutcome, track_frames: usize, stats: &FrameStats) -> SessionReport {
    let stats = stats.snapshot();
    info!(outcome = ?outcome, track_frames, "session_finished");
    info!(
        frames = stats.frames,
        avg_frame_ms = stats.avg_frame_ms,
        keys_applied = stats.keys_applied,
        keys_ignored = stats.keys_ignored,
        "frame_stats"
    );
    SessionReport {
        outcome,
        track_frames,
        stats,
    }
}
