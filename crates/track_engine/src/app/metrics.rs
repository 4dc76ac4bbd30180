use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStatsSnapshot {
    pub frames: u64,
    pub avg_frame_ms: f32,
    pub keys_applied: u64,
    pub keys_ignored: u64,
}

/// Counts rendered frames and consumed keys over one session.
#[derive(Debug)]
pub(crate) struct FrameStats {
    last_render: Option<Instant>,
    frames: u64,
    frame_time_sum: Duration,
    frame_intervals: u64,
    keys_applied: u64,
    keys_ignored: u64,
}

impl FrameStats {
    pub(crate) fn new() -> Self {
        Self {
            last_render: None,
            frames: 0,
            frame_time_sum: Duration::ZERO,
            frame_intervals: 0,
            keys_applied: 0,
            keys_ignored: 0,
        }
    }

    pub(crate) fn record_frame(&mut self, now: Instant) {
        if let Some(previous) = self.last_render {
            self.frame_time_sum = self
                .frame_time_sum
                .saturating_add(now.saturating_duration_since(previous));
            self.frame_intervals = self.frame_intervals.saturating_add(1);
        }
        self.last_render = Some(now);
        self.frames = self.frames.saturating_add(1);
    }

    pub(crate) fn record_key(&mut self, applied: bool) {
        if applied {
            self.keys_applied = self.keys_applied.saturating_add(1);
        } else {
            self.keys_ignored = self.keys_ignored.saturating_add(1);
        }
    }

    pub(crate) fn snapshot(&self) -> FrameStatsSnapshot {
        let avg_frame_ms = if self.frame_intervals == 0 {
            0.0
        } else {
            (self.frame_time_sum.as_secs_f32() / self.frame_intervals as f32) * 1000.0
        };
        FrameStatsSnapshot {
            frames: self.frames,
            avg_frame_ms,
            keys_applied: self.keys_applied,
            keys_ignored: self.keys_ignored,
        }
    }
}
