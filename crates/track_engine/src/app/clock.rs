use std::time::{Duration, Instant};

/// Paces the decoupled loops: a frame is due once `budget` has elapsed since it started.
#[derive(Debug, Clone, Copy)]
pub struct FrameClock {
    budget: Duration,
    frame_started: Instant,
}

impl FrameClock {
    pub fn new(budget: Duration, now: Instant) -> Self {
        Self {
            budget,
            frame_started: now,
        }
    }

    pub fn start_frame(&mut self, now: Instant) {
        self.frame_started = now;
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.frame_started)
    }

    /// Time left in the current frame, or `None` once the frame is due.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        let wait = compute_frame_wait(self.elapsed(now), self.budget);
        (!wait.is_zero()).then_some(wait)
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.remaining(now).is_none()
    }
}

fn compute_frame_wait(elapsed: Duration, budget: Duration) -> Duration {
    budget.saturating_sub(elapsed)
}

pub(crate) fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
