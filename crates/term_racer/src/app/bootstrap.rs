use std::io;
use std::path::PathBuf;

use track_engine::{Role, SessionConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::cli::{self, Command};
use super::error::AppError;
use super::prompt;

pub(crate) enum AppWiring {
    Help,
    Edit {
        map: PathBuf,
        /// Set when `--width` replaces the interactive prompt.
        width: Option<u32>,
        config: SessionConfig,
    },
    Play {
        map: PathBuf,
        defaulted: bool,
        config: SessionConfig,
    },
}

pub(crate) fn build_app(args: &[String]) -> Result<AppWiring, AppError> {
    init_tracing();
    info!(version = env!("CARGO_PKG_VERSION"), "startup");

    let invocation = cli::parse_args(args)?;
    let options = invocation.options;
    let wiring = match invocation.command {
        Command::Help => AppWiring::Help,
        Command::Edit { map } => AppWiring::Edit {
            map,
            width: options.width.map(prompt::check_track_width).transpose()?,
            config: options.session_config(Role::Editor)?,
        },
        Command::Play { map, defaulted } => AppWiring::Play {
            map,
            defaulted,
            config: options.session_config(Role::Player)?,
        },
    };

    if let AppWiring::Edit { config, .. } | AppWiring::Play { config, .. } = &wiring {
        info!(
            role = ?config.role,
            concurrency = ?config.concurrency,
            frame_budget_ms = config.frame_budget.as_millis() as u64,
            move_latch = config.move_latch,
            "frame_budget_resolved"
        );
    }
    Ok(wiring)
}

// The track owns stdout, so diagnostics go to stderr and stay quiet by default.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}
