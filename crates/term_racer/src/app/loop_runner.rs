use std::fs::File;
use std::io::{self, BufReader, LineWriter, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::thread;

use track_engine::{
    run_editor, run_player, RawModeGuard, SessionConfig, SessionOutcome, SessionReport,
    TerminalKeys, TrackHeader, TrackReader, TrackWriter,
};
use tracing::info;

use super::bootstrap::AppWiring;
use super::cli::usage_text;
use super::error::AppError;
use super::prompt;

const EDITOR_CONTROLS: &str = concat!(
    "CONTROLS: 'j' for left, 'k' for right.\n",
    "          's'/'d' move left line left/right\n",
    "          'f'/'g' move right line left/right\n",
    "          'c'/'v' make track smaller/bigger\n",
    "          'Q' quit and save the map."
);

const PLAYER_CONTROLS: &str = "CONTROLS: 'j' for left, 'k' for right, 'Q' to quit.";

pub(crate) fn run(wiring: AppWiring) -> ExitCode {
    match execute(wiring) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_failure(&err),
    }
}

/// Prints a fatal error once the terminal is back in its normal mode.
pub(crate) fn report_failure(err: &AppError) -> ExitCode {
    eprintln!("term_racer: {err}");
    if matches!(err, AppError::Usage(_)) {
        eprintln!("\n{}", usage_text());
    }
    let code = err.exit_code();
    info!(exit_code = code, error = %err, "exit_failure");
    ExitCode::from(code)
}

fn execute(wiring: AppWiring) -> Result<(), AppError> {
    match wiring {
        AppWiring::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        AppWiring::Edit { map, width, config } => edit(&map, width, &config),
        AppWiring::Play {
            map,
            defaulted,
            config,
        } => play(&map, defaulted, &config),
    }
}

fn edit(map: &Path, width: Option<u32>, config: &SessionConfig) -> Result<(), AppError> {
    let file = File::create(map).map_err(|source| open_error(map, source))?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "{EDITOR_CONTROLS}").map_err(AppError::Console)?;

    let width = match width {
        Some(width) => width,
        None => prompt::read_track_width(io::stdin().lock(), &mut out)?,
    };
    let header = TrackHeader::centered(width);
    let mut track = TrackWriter::create(LineWriter::new(file), header)?;

    let report = {
        let _raw = RawModeGuard::acquire()?;
        intro(&mut out, header, config)?;
        run_editor(config, TerminalKeys::new(), &mut track, &mut out)?
    };
    log_report(&report);

    writeln!(out, "Saved the map, bye.").map_err(AppError::Console)?;
    Ok(())
}

fn play(map: &Path, defaulted: bool, config: &SessionConfig) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if defaulted {
        writeln!(out, "No map specified, using {} (term_racer play <map>)\n", map.display())
            .map_err(AppError::Console)?;
    }

    let file = File::open(map).map_err(|source| open_error(map, source))?;
    let mut track = TrackReader::new(BufReader::new(file))?;
    let header = track.header();
    writeln!(out, "{PLAYER_CONTROLS}").map_err(AppError::Console)?;

    let report = {
        let _raw = RawModeGuard::acquire()?;
        intro(&mut out, header, config)?;
        run_player(config, TerminalKeys::new(), &mut track, &mut out)?
    };
    log_report(&report);

    let banner = match report.outcome {
        SessionOutcome::Goal => {
            "################################# GOAL #############################\n\n\
Congratulations, you reached the Goal."
        }
        SessionOutcome::Crash { .. } => {
            "******************************** CRASH ****************************\n\n\
Sorry, but you left the road, please try again."
        }
        SessionOutcome::Quit => "Oh, and I shall quit, bye!",
    };
    writeln!(out, "{banner}").map_err(AppError::Console)?;
    Ok(())
}

// Runs in raw mode, so lines end in "\r\n" explicitly.
fn intro<W: Write>(
    out: &mut W,
    header: TrackHeader,
    config: &SessionConfig,
) -> Result<(), AppError> {
    write!(
        out,
        "(please make sure to have at least {} char width)\r\n{}\r\n",
        header.width,
        header.divider_line()
    )
    .and_then(|()| out.flush())
    .map_err(AppError::Console)?;
    thread::sleep(config.intro_delay);
    Ok(())
}

fn open_error(map: &Path, source: io::Error) -> AppError {
    AppError::OpenMap {
        path: PathBuf::from(map),
        source,
    }
}

fn log_report(report: &SessionReport) {
    match report.outcome {
        SessionOutcome::Crash { frame, xpos } => {
            info!(frame, xpos, track_frames = report.track_frames, "player_crashed");
        }
        outcome => info!(?outcome, track_frames = report.track_frames, "session_ended"),
    }
}
