use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use super::clock::normalize_non_zero_duration;

pub const FRAME_MS_ENV_VAR: &str = "TERM_RACER_FRAME_MS";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Editor,
    Player,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// One thread; the bounded input wait doubles as the frame delay.
    Cooperative,
    /// A dedicated input thread feeds the loop, which paces itself by wall clock.
    Threaded,
}

/// The program flavors the session can run as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Editor,
    ThreadEditor,
    Racer,
    LatchedRacer,
    ThreadRacer,
}

impl Variant {
    pub const ALL: [Variant; 5] = [
        Variant::Editor,
        Variant::ThreadEditor,
        Variant::Racer,
        Variant::LatchedRacer,
        Variant::ThreadRacer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Variant::Editor => "editor",
            Variant::ThreadEditor => "thread-editor",
            Variant::Racer => "racer",
            Variant::LatchedRacer => "latched-racer",
            Variant::ThreadRacer => "thread-racer",
        }
    }

    pub fn role(self) -> Role {
        match self {
            Variant::Editor | Variant::ThreadEditor => Role::Editor,
            Variant::Racer | Variant::LatchedRacer | Variant::ThreadRacer => Role::Player,
        }
    }

    pub fn config(self) -> SessionConfig {
        let (concurrency, frame_ms, move_latch) = match self {
            Variant::Editor => (Concurrency::Cooperative, 180, false),
            Variant::ThreadEditor => (Concurrency::Threaded, 180, false),
            Variant::Racer => (Concurrency::Cooperative, 120, false),
            Variant::LatchedRacer => (Concurrency::Threaded, 120, true),
            Variant::ThreadRacer => (Concurrency::Threaded, 100, false),
        };
        SessionConfig {
            role: self.role(),
            concurrency,
            frame_budget: Duration::from_millis(frame_ms),
            move_latch,
            intro_delay: DEFAULT_INTRO_DELAY,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Variant {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Variant::ALL
            .into_iter()
            .find(|variant| variant.name() == raw)
            .ok_or_else(|| {
                let known = Variant::ALL.map(Variant::name).join(", ");
                format!("unknown variant '{raw}' (expected one of: {known})")
            })
    }
}

pub const DEFAULT_INTRO_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub role: Role,
    pub concurrency: Concurrency,
    pub frame_budget: Duration,
    /// Player only: honor a single steering key per track frame.
    pub move_latch: bool,
    pub intro_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Variant::Racer.config()
    }
}

impl SessionConfig {
    /// Applies the frame budget override chain: explicit value, then the
    /// environment, then the variant default. Zero never survives.
    pub fn with_frame_budget_override(mut self, cli_frame_ms: Option<u64>) -> Self {
        let fallback = self.frame_budget;
        let resolved = match cli_frame_ms {
            Some(ms) => Duration::from_millis(ms),
            None => resolve_env_frame_budget(env::var(FRAME_MS_ENV_VAR), fallback),
        };
        self.frame_budget = normalize_non_zero_duration(resolved, fallback);
        self
    }
}

fn resolve_env_frame_budget(value: Result<String, env::VarError>, fallback: Duration) -> Duration {
    match value {
        Ok(value) => match value.trim().parse::<u64>() {
            Ok(ms) => Duration::from_millis(ms),
            Err(_) => {
                warn!(
                    env_var = FRAME_MS_ENV_VAR,
                    value = value.as_str(),
                    "invalid frame budget env var value; falling back to variant default"
                );
                fallback
            }
        },
        Err(env::VarError::NotPresent) => fallback,
        Err(err) => {
            warn!(
                env_var = FRAME_MS_ENV_VAR,
                error = %err,
                "unable to read frame budget env var; falling back to variant default"
            );
            fallback
        }
    }
}
