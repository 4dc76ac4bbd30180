use crate::track::{Frame, Geometry, TrackError, TrackHeader};

use super::input::{EditorCommand, PlayerCommand};

/// Minimum distance the inward commands keep between the two margins.
pub const MIN_MARGIN_GAP: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    Goal,
    Crash { frame: usize, xpos: i64 },
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    OnTrack,
    Crash,
}

/// The marker crashes when it sits on or beyond either margin.
pub fn evaluate(frame: Frame, xpos: i64) -> Verdict {
    if xpos <= i64::from(frame.left) || xpos >= i64::from(frame.right) {
        Verdict::Crash
    } else {
        Verdict::OnTrack
    }
}

/// Margins steered by the track author.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditorState {
    geometry: Geometry,
    frame: Frame,
}

impl EditorState {
    pub fn new(geometry: Geometry, frame: Frame) -> Self {
        Self { geometry, frame }
    }

    /// Starts from the header's opening margins, which must already be a legal frame.
    pub fn from_header(header: TrackHeader) -> Result<Self, TrackError> {
        let geometry = header.geometry()?;
        let start = header.editor_start_frame();
        if !geometry.contains(start) {
            return Err(TrackError::FrameRange {
                frame: 1,
                line: 2,
                left: start.left,
                right: start.right,
                xmin: geometry.xmin(),
                xmax: geometry.xmax(),
            });
        }
        Ok(Self::new(geometry, start))
    }

    pub fn frame(&self) -> Frame {
        self.frame
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Applies `command` if its guard allows it. Returns whether the margins changed.
    pub fn apply(&mut self, command: EditorCommand) -> bool {
        let xmin = self.geometry.xmin();
        let xmax = self.geometry.xmax();
        let Frame { left, right } = self.frame;

        let next = match command {
            EditorCommand::ShiftLeft if left > xmin => Frame::new(left - 1, right - 1),
            EditorCommand::ShiftRight if right < xmax => Frame::new(left + 1, right + 1),
            EditorCommand::WidenLeft if left > xmin => Frame::new(left - 1, right),
            EditorCommand::NarrowLeft if left + MIN_MARGIN_GAP < right => {
                Frame::new(left + 1, right)
            }
            EditorCommand::NarrowRight if right > left + MIN_MARGIN_GAP => {
                Frame::new(left, right - 1)
            }
            EditorCommand::WidenRight if right < xmax => Frame::new(left, right + 1),
            EditorCommand::Narrow if right - left >= 2 * MIN_MARGIN_GAP => {
                Frame::new(left + 1, right - 1)
            }
            EditorCommand::Widen if left > xmin && right < xmax => {
                Frame::new(left - 1, right + 1)
            }
            _ => return false,
        };
        self.frame = next;
        true
    }
}

/// The player's marker plus the per-frame steering latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerState {
    xpos: i64,
    latch: bool,
    moved_this_frame: bool,
}

impl PlayerState {
    pub fn new(start_pos: u32, latch: bool) -> Self {
        Self {
            xpos: i64::from(start_pos),
            latch,
            moved_this_frame: false,
        }
    }

    pub fn xpos(&self) -> i64 {
        self.xpos
    }

    /// Opens a new track frame, releasing the latch.
    pub fn begin_frame(&mut self) {
        self.moved_this_frame = false;
    }

    /// Moves the marker one cell. Returns `false` when the latch swallowed the move.
    pub fn steer(&mut self, command: PlayerCommand) -> bool {
        let delta = match command {
            PlayerCommand::SteerLeft => -1,
            PlayerCommand::SteerRight => 1,
            PlayerCommand::Quit => return false,
        };
        if self.latch && self.moved_this_frame {
            return false;
        }
        self.xpos += delta;
        self.moved_this_frame = true;
        true
    }

    pub fn evaluate(&self, frame: Frame) -> Verdict {
        evaluate(frame, self.xpos)
    }
}
