use std::io::{self, Write};

use crate::track::{Frame, Geometry};

pub const BORDER_GLYPH: u8 = b'|';
pub const FILL_GLYPH: u8 = b' ';
pub const MARGIN_GLYPH: u8 = b'#';
pub const PLAYER_GLYPH: u8 = b'V';
pub const CRASH_GLYPH: u8 = b'X';

// Raw mode disables output post-processing, so every line carries its own carriage return.
const LINE_END: &[u8] = b"\r\n";

/// Reusable single-line canvas of `width + 1` cells plus the line terminator.
#[derive(Debug, Clone)]
pub struct LineRenderer {
    width: usize,
    line: Vec<u8>,
}

impl LineRenderer {
    pub fn new(geometry: Geometry) -> Self {
        let width = geometry.width() as usize;
        let mut line = Vec::with_capacity(width + 1 + LINE_END.len());
        line.extend((0..=width).map(|cell| blank_cell(cell, width)));
        line.extend_from_slice(LINE_END);
        Self { width, line }
    }

    /// Track cells currently held, without the terminator.
    pub fn cells(&self) -> &[u8] {
        &self.line[..=self.width]
    }

    pub fn draw_margins<W: Write>(&mut self, frame: Frame, out: &mut W) -> io::Result<()> {
        self.draw(frame, None, out)
    }

    pub fn draw_player<W: Write>(
        &mut self,
        frame: Frame,
        xpos: i64,
        crashed: bool,
        out: &mut W,
    ) -> io::Result<()> {
        let glyph = if crashed { CRASH_GLYPH } else { PLAYER_GLYPH };
        self.draw(frame, Some((xpos, glyph)), out)
    }

    fn draw<W: Write>(
        &mut self,
        frame: Frame,
        marker: Option<(i64, u8)>,
        out: &mut W,
    ) -> io::Result<()> {
        let left = self.clamp_cell(i64::from(frame.left));
        let right = self.clamp_cell(i64::from(frame.right));
        let marker = marker.map(|(xpos, glyph)| (self.clamp_cell(xpos), glyph));

        self.line[left] = MARGIN_GLYPH;
        self.line[right] = MARGIN_GLYPH;
        if let Some((cell, glyph)) = marker {
            self.line[cell] = glyph;
        }

        let written = out.write_all(&self.line).and_then(|()| out.flush());

        self.restore(left);
        self.restore(right);
        if let Some((cell, _)) = marker {
            self.restore(cell);
        }
        written
    }

    // Off-track markers are pinned to the border cell on that side.
    fn clamp_cell(&self, position: i64) -> usize {
        position.clamp(0, self.width as i64) as usize
    }

    fn restore(&mut self, cell: usize) {
        self.line[cell] = blank_cell(cell, self.width);
    }
}

fn blank_cell(cell: usize, width: usize) -> u8 {
    if cell == 0 || cell == width {
        BORDER_GLYPH
    } else {
        FILL_GLYPH
    }
}
