use crate::mode::TimeLimit;

/// Round countdown driven by runtime ticks. Rendering the clock is up to
/// the front-end; this only tracks time left and whether the countdown
/// is still armed.
#[derive(Debug, Clone, PartialEq)]
pub struct Countdown {
    total_secs: f64,
    seconds_remaining: f64,
    running: bool,
}

impl Countdown {
    /// An inactive countdown; used when the time limit is `None`
    pub fn idle() -> Self {
        Self {
            total_secs: 0.0,
            seconds_remaining: 0.0,
            running: false,
        }
    }

    pub fn start(limit: TimeLimit) -> Self {
        let total = limit.total_secs() as f64;
        Self {
            total_secs: total,
            seconds_remaining: total,
            running: limit.is_limited(),
        }
    }

    /// Advance by `dt_secs`. Returns true exactly once, on the tick that
    /// runs the clock out.
    pub fn on_tick(&mut self, dt_secs: f64) -> bool {
        if !self.running {
            return false;
        }
        self.seconds_remaining = (self.seconds_remaining - dt_secs).max(0.0);
        if self.seconds_remaining <= 0.0 {
            self.running = false;
            return true;
        }
        false
    }

    /// Stop without firing
    pub fn clear(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn total_secs(&self) -> f64 {
        self.total_secs
    }

    pub fn seconds_remaining(&self) -> f64 {
        self.seconds_remaining
    }

    /// Fraction of the limit still on the clock, `None` without a limit
    pub fn remaining_fraction(&self) -> Option<f64> {
        if self.total_secs <= 0.0 {
            None
        } else {
            Some((self.seconds_remaining / self.total_secs).clamp(0.0, 1.0))
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_countdown_never_fires() {
        let mut c = Countdown::start(TimeLimit::None);
        assert!(!c.is_running());
        assert!(!c.on_tick(100.0));
        assert_eq!(c.remaining_fraction(), None);
    }

    #[test]
    fn fires_once_when_time_runs_out() {
        let mut c = Countdown::start(TimeLimit::Secs45);
        assert!(c.is_running());
        assert!(!c.on_tick(44.0));
        assert!(c.on_tick(1.5));
        assert_eq!(c.seconds_remaining(), 0.0);
        assert!(!c.on_tick(1.0));
        assert_eq!(c.remaining_fraction(), Some(0.0));
    }

    #[test]
    fn cleared_countdown_does_not_fire() {
        let mut c = Countdown::start(TimeLimit::Secs90);
        c.on_tick(30.0);
        c.clear();
        assert!(!c.on_tick(120.0));
        let fraction = c.remaining_fraction().unwrap();
        assert!((fraction - 60.0 / 90.0).abs() < 1e-9);
    }
}
