//! Timestamp-based cooldown gate

use serde::{Deserialize, Serialize};

/// Guards an action so it cannot repeat before `duration_ms` has elapsed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cooldown {
    pub duration_ms: f64,
    /// Time the action last fired; `None` means it never has
    last_fired: Option<f64>,
}

impl Cooldown {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            last_fired: None,
        }
    }

    #[inline]
    pub fn ready(&self, now_ms: f64) -> bool {
        self.remaining(now_ms) <= 0.0
    }

    /// Milliseconds until the gate opens (0 when ready)
    pub fn remaining(&self, now_ms: f64) -> f64 {
        match self.last_fired {
            Some(last) => (self.duration_ms - (now_ms - last)).max(0.0),
            None => 0.0,
        }
    }

    /// Record a firing at `now_ms`
    #[inline]
    pub fn fire(&mut self, now_ms: f64) {
        self.last_fired = Some(now_ms);
    }

    /// Fire if ready; returns whether it fired
    pub fn try_fire(&mut self, now_ms: f64) -> bool {
        if self.ready(now_ms) {
            self.fire(now_ms);
            true
        } else {
            false
        }
    }

    pub fn last_fired(&self) -> Option<f64> {
        self.last_fired
    }
}

/// Countdown timer for effects with a duration (hit flash, charge, skills)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    remaining_ms: f64,
}

impl Timer {
    pub fn start(&mut self, duration_ms: f64) {
        self.remaining_ms = duration_ms;
    }

    /// Count down by `dt_ms`; returns true on the tick the timer runs out
    pub fn tick(&mut self, dt_ms: f64) -> bool {
        if self.remaining_ms <= 0.0 {
            return false;
        }
        self.remaining_ms -= dt_ms;
        if self.remaining_ms <= 0.0 {
            self.remaining_ms = 0.0;
            return true;
        }
        false
    }

    #[inline]
    pub fn active(&self) -> bool {
        self.remaining_ms > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_gate_is_ready() {
        let gate = Cooldown::new(250.0);
        assert!(gate.ready(0.0));
        assert_eq!(gate.remaining(0.0), 0.0);
    }

    #[test]
    fn test_gate_blocks_until_duration() {
        let mut gate = Cooldown::new(1000.0);
        assert!(gate.try_fire(100.0));
        assert!(!gate.try_fire(1099.0));
        assert_eq!(gate.remaining(600.0), 500.0);
        assert!(gate.try_fire(1100.0));
        assert_eq!(gate.last_fired(), Some(1100.0));
    }

    #[test]
    fn test_timer_reports_expiry_once() {
        let mut timer = Timer::default();
        timer.start(100.0);
        assert!(timer.active());
        assert!(!timer.tick(60.0));
        assert!(timer.tick(60.0));
        assert!(!timer.active());
        assert!(!timer.tick(60.0));
    }
}
