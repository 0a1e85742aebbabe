//! Deadline timers evaluated on the frame clock.

/// A single pending deadline. Re-arming replaces it; timers never stack.
#[derive(Debug, Clone)]
pub struct Debounce {
    delay_ms: f64,
    deadline_ms: Option<f64>,
}

impl Debounce {
    pub fn new(delay_ms: f64) -> Self {
        Self {
            delay_ms,
            deadline_ms: None,
        }
    }

    /// (Re)start the countdown from `now`.
    pub fn arm(&mut self, now_ms: f64) {
        self.deadline_ms = Some(now_ms + self.delay_ms);
    }

    pub fn clear(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// True exactly once when the deadline has passed; disarms itself.
    pub fn fire_if_due(&mut self, now_ms: f64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_delay() {
        let mut timer = Debounce::new(100.0);
        timer.arm(0.0);
        assert!(!timer.fire_if_due(99.0));
        assert!(timer.fire_if_due(100.0));
        assert!(!timer.fire_if_due(200.0));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_rearm_pushes_deadline() {
        let mut timer = Debounce::new(100.0);
        timer.arm(0.0);
        timer.arm(80.0);
        assert!(!timer.fire_if_due(150.0));
        assert!(timer.fire_if_due(180.0));
    }

    #[test]
    fn test_clear() {
        let mut timer = Debounce::new(10.0);
        timer.arm(0.0);
        timer.clear();
        assert!(!timer.fire_if_due(50.0));
    }
}
