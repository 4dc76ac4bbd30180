use std::io::{BufRead, Write};

use tracing::trace;

use super::header::{parse_unsigned, TrackHeader};
use super::types::{Frame, Geometry, TrackError};

/// Forward-only reader over the frames of a map file.
pub struct TrackReader<R> {
    source: R,
    header: TrackHeader,
    geometry: Geometry,
    frames_read: usize,
    lines_read: usize,
    line: String,
}

impl<R: BufRead> TrackReader<R> {
    /// Consumes the header line and validates the track width.
    pub fn new(mut source: R) -> Result<Self, TrackError> {
        let mut line = String::new();
        source.read_line(&mut line).map_err(TrackError::Read)?;
        let header = TrackHeader::parse(&line)?;
        let geometry = header.geometry()?;

        Ok(Self {
            source,
            header,
            geometry,
            frames_read: 0,
            lines_read: 1,
            line,
        })
    }

    pub fn header(&self) -> TrackHeader {
        self.header
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn frames_read(&self) -> usize {
        self.frames_read
    }

    /// Returns `Ok(None)` at the end of the track.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, TrackError> {
        loop {
            self.line.clear();
            let bytes = self
                .source
                .read_line(&mut self.line)
                .map_err(TrackError::Read)?;
            if bytes == 0 {
                return Ok(None);
            }
            self.lines_read += 1;
            if self.line.trim().is_empty() {
                continue;
            }

            let frame_index = self.frames_read + 1;
            let frame = parse_frame_line(&self.line).ok_or_else(|| TrackError::FrameFormat {
                frame: frame_index,
                line: self.lines_read,
                text: self.line.trim_end_matches(['\r', '\n']).to_string(),
            })?;
            if !self.geometry.contains(frame) {
                return Err(TrackError::FrameRange {
                    frame: frame_index,
                    line: self.lines_read,
                    left: frame.left,
                    right: frame.right,
                    xmin: self.geometry.xmin(),
                    xmax: self.geometry.xmax(),
                });
            }

            self.frames_read = frame_index;
            trace!(frame = frame_index, left = frame.left, right = frame.right, "frame_read");
            return Ok(Some(frame));
        }
    }
}

fn parse_frame_line(line: &str) -> Option<Frame> {
    let mut fields = line.split_whitespace();
    let left = parse_unsigned(fields.next()?)?;
    let right = parse_unsigned(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(Frame::new(left, right))
}

/// Append-only sink for recorded frames. The header is written on creation.
pub struct TrackWriter<W: Write> {
    sink: W,
    header: TrackHeader,
    frames_written: usize,
}

impl<W: Write> TrackWriter<W> {
    pub fn create(mut sink: W, header: TrackHeader) -> Result<Self, TrackError> {
        header.geometry()?;
        writeln!(sink, "{header}")
            .and_then(|()| sink.flush())
            .map_err(|source| TrackError::Write { line: 1, source })?;

        Ok(Self {
            sink,
            header,
            frames_written: 0,
        })
    }

    pub fn header(&self) -> TrackHeader {
        self.header
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }

    /// Writes and flushes one frame line.
    pub fn write_frame(&mut self, frame: Frame) -> Result<(), TrackError> {
        let line = self.frames_written + 2;
        writeln!(self.sink, "{} {}", frame.left, frame.right)
            .and_then(|()| self.sink.flush())
            .map_err(|source| TrackError::Write { line, source })?;
        self.frames_written += 1;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
