mod clock;
mod config;
mod input;
mod input_thread;
mod key_source;
mod loop_runner;
mod metrics;
mod renderer;
mod state;
mod terminal;

pub use clock::FrameClock;
pub use config::{
    Concurrency, Role, SessionConfig, Variant, DEFAULT_INTRO_DELAY, FRAME_MS_ENV_VAR,
};
pub use input::{EditorCommand, KeyEvent, PlayerCommand};
pub use input_thread::RunFlag;
pub use key_source::{InputError, KeyFeed, KeyFeeder, KeySource, ScriptStep, ScriptedKeys};
pub use loop_runner::{run_editor, run_player, SessionError, SessionReport};
pub use metrics::FrameStatsSnapshot;
pub use renderer::{
    LineRenderer, BORDER_GLYPH, CRASH_GLYPH, FILL_GLYPH, MARGIN_GLYPH, PLAYER_GLYPH,
};
pub use state::{evaluate, EditorState, PlayerState, SessionOutcome, Verdict, MIN_MARGIN_GAP};
pub use terminal::{RawModeGuard, TerminalError, TerminalKeys};
