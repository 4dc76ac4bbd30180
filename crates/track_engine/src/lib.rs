//! Core of the terminal track game: map streams, input sources, frame pacing
//! and the editor/player session loops.

pub mod app;
pub mod track;

pub use app::{
    evaluate, run_editor, run_player, Concurrency, EditorCommand, EditorState, FrameClock,
    FrameStatsSnapshot, InputError, KeyEvent, KeyFeed, KeyFeeder, KeySource, LineRenderer,
    PlayerCommand, PlayerState, RawModeGuard, Role, RunFlag, ScriptStep, ScriptedKeys,
    SessionConfig, SessionError, SessionOutcome, SessionReport, TerminalError, TerminalKeys,
    Variant, Verdict, DEFAULT_INTRO_DELAY, FRAME_MS_ENV_VAR, MIN_MARGIN_GAP,
};
pub use track::{
    Frame, Geometry, TrackError, TrackHeader, TrackReader, TrackWriter, MAX_TRACK_WIDTH,
    MIN_TRACK_WIDTH,
};

/// Map read by the player when no path is given.
pub const DEFAULT_MAP_FILE: &str = "default.map";

/// Track widths the editor accepts.
pub const EDITOR_WIDTH_RANGE: std::ops::RangeInclusive<u32> = 20..=80;
