use std::io;
use std::path::PathBuf;

use thiserror::Error;
use track_engine::{SessionError, TerminalError, TrackError};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("could not open map file {}: {source}", path.display())]
    OpenMap {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0}")]
    InvalidWidthInput(String),
    #[error("failed to read the track width: {0}")]
    PromptRead(#[source] io::Error),
    #[error("failed to write to the terminal: {0}")]
    Console(#[source] io::Error),
    #[error(transparent)]
    Track(#[from] TrackError),
    #[error(transparent)]
    Terminal(#[from] TerminalError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl AppError {
    pub(crate) fn exit_code(&self) -> u8 {
        match self {
            AppError::Usage(_) => 2,
            AppError::OpenMap { .. } => 3,
            AppError::InvalidWidthInput(_) | AppError::PromptRead(_) => 6,
            AppError::Console(_) => 7,
            AppError::Track(err) => track_exit_code(err),
            AppError::Terminal(_) => 9,
            AppError::Session(err) => match err {
                SessionError::Track(err) => track_exit_code(err),
                SessionError::Render(_) => 7,
                SessionError::InputThreadSpawn(_) => 10,
                SessionError::Input(_) => 11,
            },
        }
    }
}

fn track_exit_code(err: &TrackError) -> u8 {
    match err {
        TrackError::Read(_) => 3,
        TrackError::HeaderFormat { .. } | TrackError::InvalidWidth { .. } => 4,
        TrackError::Write { .. } => 7,
        TrackError::FrameFormat { .. } | TrackError::FrameRange { .. } => 8,
    }
}
