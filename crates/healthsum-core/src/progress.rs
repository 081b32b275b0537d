//! Simulated upload progress
//!
//! The transports expose no incremental progress, so the bar ramps up on a
//! timer and stays below completion until the real response arrives.

use rand::Rng;

/// Largest increment added by one tick (exclusive)
pub const MAX_TICK_INCREMENT: f64 = 15.0;
/// Highest value reachable while the request is outstanding (always below 90)
pub const SIMULATED_CEILING: f64 = 89.0;
pub const COMPLETE: f64 = 100.0;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgressSimulator {
    percent: f64,
    running: bool,
}

impl ProgressSimulator {
    /// A fresh simulator at 0 that accepts ticks
    pub fn started() -> Self {
        Self {
            percent: 0.0,
            running: true,
        }
    }

    pub fn percent(&self) -> f64 {
        self.percent
    }

    /// Whole-percent value for display
    pub fn display_percent(&self) -> u8 {
        self.percent.round().clamp(0.0, COMPLETE) as u8
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Advance by a random increment in `[0, 15)`
    ///
    /// Returns the new value, or `None` once the simulator has been stopped.
    pub fn tick<R: Rng>(&mut self, rng: &mut R) -> Option<f64> {
        let increment = rng.gen_range(0.0..MAX_TICK_INCREMENT);
        self.advance(increment)
    }

    /// Advance by an explicit increment, clamped below the ceiling
    pub fn advance(&mut self, increment: f64) -> Option<f64> {
        if !self.running {
            return None;
        }
        let increment = if increment.is_finite() {
            increment.max(0.0)
        } else {
            0.0
        };
        self.percent = (self.percent + increment).min(SIMULATED_CEILING);
        Some(self.percent)
    }

    /// Stop and jump to 100 (successful response)
    pub fn complete(&mut self) {
        self.running = false;
        self.percent = COMPLETE;
    }

    /// Stop and drop back to 0 (failed response)
    pub fn abandon(&mut self) {
        self.running = false;
        self.percent = 0.0;
    }
}
