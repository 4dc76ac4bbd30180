use std::io;

use thiserror::Error;

/// Smallest width that still leaves room for `1 <= left < right <= width - 1`.
pub const MIN_TRACK_WIDTH: u32 = 3;

/// Widest track a map may declare; each rendered line holds `width + 1` cells.
pub const MAX_TRACK_WIDTH: u32 = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub left: u32,
    pub right: u32,
}

impl Frame {
    pub const fn new(left: u32, right: u32) -> Self {
        Self { left, right }
    }

    pub fn gap(self) -> u32 {
        self.right.saturating_sub(self.left)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    width: u32,
}

impl Geometry {
    pub fn new(width: u32) -> Result<Self, TrackError> {
        if !(MIN_TRACK_WIDTH..=MAX_TRACK_WIDTH).contains(&width) {
            return Err(TrackError::InvalidWidth { width });
        }
        Ok(Self { width })
    }

    pub fn width(self) -> u32 {
        self.width
    }

    pub fn xmin(self) -> u32 {
        1
    }

    pub fn xmax(self) -> u32 {
        self.width - 1
    }

    pub fn contains(self, frame: Frame) -> bool {
        frame.left >= self.xmin() && frame.right <= self.xmax() && frame.left < frame.right
    }
}

#[derive(Debug, Error)]
pub enum TrackError {
    #[error("map header at line 1 is not `(size)(startpos)`: {text:?}")]
    HeaderFormat { text: String },
    #[error("track width {width} is outside {MIN_TRACK_WIDTH}..={MAX_TRACK_WIDTH}")]
    InvalidWidth { width: u32 },
    #[error("map frame {frame} (line {line}) is not two unsigned numbers: {text:?}")]
    FrameFormat {
        frame: usize,
        line: usize,
        text: String,
    },
    #[error(
        "map frame {frame} (line {line}) is out of range: {left} {right} \
(margins must satisfy {xmin} <= left < right <= {xmax})"
    )]
    FrameRange {
        frame: usize,
        line: usize,
        left: u32,
        right: u32,
        xmin: u32,
        xmax: u32,
    },
    #[error("failed to read map file: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write map file at line {line}: {source}")]
    Write {
        line: usize,
        #[source]
        source: io::Error,
    },
}
