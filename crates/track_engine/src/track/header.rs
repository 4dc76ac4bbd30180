use std::fmt;

use super::types::{Frame, Geometry, TrackError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackHeader {
    pub width: u32,
    pub start_pos: u32,
}

impl TrackHeader {
    /// Header for a freshly edited track: the start sits in the middle.
    pub fn centered(width: u32) -> Self {
        Self {
            width,
            start_pos: width / 2,
        }
    }

    pub fn parse(line: &str) -> Result<Self, TrackError> {
        let format_error = || TrackError::HeaderFormat {
            text: line.trim_end_matches(['\r', '\n']).to_string(),
        };
        let rest = line.trim_end().strip_prefix('(').ok_or_else(format_error)?;
        let (width, rest) = rest.split_once(")(").ok_or_else(format_error)?;
        let start_pos = rest.strip_suffix(')').ok_or_else(format_error)?;

        Ok(Self {
            width: parse_unsigned(width).ok_or_else(format_error)?,
            start_pos: parse_unsigned(start_pos).ok_or_else(format_error)?,
        })
    }

    pub fn geometry(self) -> Result<Geometry, TrackError> {
        Geometry::new(self.width)
    }

    /// Opening margins the editor starts from, a third of the width either side of the start.
    pub fn editor_start_frame(self) -> Frame {
        let third = self.width / 3;
        Frame::new(
            self.start_pos.saturating_sub(third),
            self.start_pos.saturating_add(third),
        )
    }

    pub fn divider_line(self) -> String {
        let dashes = self.width.saturating_sub(1) as usize;
        format!("|{}|", "-".repeat(dashes))
    }
}

impl fmt::Display for TrackHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})({})", self.width, self.start_pos)
    }
}

pub(crate) fn parse_unsigned(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok()
}
