//! Per-frame advance loop.
//!
//! The host calls into the engine once per display refresh with a
//! monotonically increasing timestamp in milliseconds. A [`FrameLoop`] turns
//! those timestamps into capped time steps and remembers whether its owner
//! still wants frames. Nothing here schedules callbacks itself, so a cancelled
//! loop cannot leak a pending frame.

use crate::config::MAX_FRAME_STEP_MS;

/// Whether an animation wants another frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Running,
    Settled,
}

/// Something advanced by elapsed time.
pub trait Animate {
    /// Advance by `dt` seconds. Returning [`Progress::Settled`] means the
    /// final exact value has been written and the loop should stop.
    fn step(&mut self, dt: f64) -> Progress;
}

#[derive(Debug, Clone)]
pub struct FrameLoop {
    scheduled: bool,
    last_frame_ms: Option<f64>,
    max_step_ms: f64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::with_max_step(MAX_FRAME_STEP_MS)
    }

    /// Loop whose steps never exceed `max_step_ms`.
    pub fn with_max_step(max_step_ms: f64) -> Self {
        Self {
            scheduled: false,
            last_frame_ms: None,
            max_step_ms,
        }
    }

    /// Request frames from `now` on. Starting a running loop keeps its clock.
    pub fn start(&mut self, now_ms: f64) {
        if !self.scheduled {
            self.scheduled = true;
            self.last_frame_ms = Some(now_ms);
        }
    }

    /// Stop requesting frames and forget the clock.
    pub fn cancel(&mut self) {
        self.scheduled = false;
        self.last_frame_ms = None;
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    /// Elapsed seconds since the previous frame, capped at the max step.
    ///
    /// Returns `None` when the loop is not scheduled. A timestamp that goes
    /// backwards yields a zero step.
    pub fn advance(&mut self, now_ms: f64) -> Option<f64> {
        if !self.scheduled {
            return None;
        }
        let last = self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        let elapsed_ms = (now_ms - last).clamp(0.0, self.max_step_ms);
        Some(elapsed_ms / 1000.0)
    }

    /// Advance `animation` by one frame; stops the loop once it settles.
    ///
    /// Returns true if another frame is wanted.
    pub fn drive<A: Animate + ?Sized>(&mut self, now_ms: f64, animation: &mut A) -> bool {
        let Some(dt) = self.advance(now_ms) else {
            return false;
        };
        match animation.step(dt) {
            Progress::Running => true,
            Progress::Settled => {
                self.cancel();
                false
            }
        }
    }
}

impl Default for FrameLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Countdown {
        remaining: f64,
        steps: Vec<f64>,
    }

    impl Animate for Countdown {
        fn step(&mut self, dt: f64) -> Progress {
            self.steps.push(dt);
            self.remaining -= dt;
            if self.remaining <= 0.0 {
                self.remaining = 0.0;
                Progress::Settled
            } else {
                Progress::Running
            }
        }
    }

    #[test]
    fn test_unscheduled_loop_does_nothing() {
        let mut frame = FrameLoop::new();
        assert_eq!(frame.advance(16.0), None);
    }

    #[test]
    fn test_step_is_capped() {
        let mut frame = FrameLoop::new();
        frame.start(0.0);
        assert_eq!(frame.advance(0.0), Some(0.0));
        assert_eq!(frame.advance(16.0), Some(0.016));
        // A 5 second stall advances by at most 100ms.
        assert_eq!(frame.advance(5016.0), Some(0.1));
    }

    #[test]
    fn test_backwards_clock_yields_zero() {
        let mut frame = FrameLoop::new();
        frame.start(100.0);
        assert_eq!(frame.advance(50.0), Some(0.0));
    }

    #[test]
    fn test_drive_stops_when_settled() {
        let mut frame = FrameLoop::new();
        let mut anim = Countdown {
            remaining: 0.05,
            steps: Vec::new(),
        };
        frame.start(0.0);
        let mut now = 0.0;
        let mut frames = 0;
        while frame.drive(now, &mut anim) {
            now += 20.0;
            frames += 1;
            assert!(frames < 100);
        }
        assert!(!frame.is_scheduled());
        assert_eq!(anim.remaining, 0.0);
        // Once stopped, further frames don't reach the animation.
        let steps = anim.steps.len();
        assert!(!frame.drive(now + 20.0, &mut anim));
        assert_eq!(anim.steps.len(), steps);
    }

    #[test]
    fn test_cancel_forgets_clock() {
        let mut frame = FrameLoop::new();
        frame.start(0.0);
        frame.cancel();
        frame.start(1000.0);
        assert_eq!(frame.advance(1016.0), Some(0.016));
    }
}
