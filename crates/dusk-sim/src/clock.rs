//! Fixed-rate simulation clock.

/// Simulation ticks per second. A compatibility constant, not a tunable.
pub const TICRATE: u32 = 35;

/// Length of one tick in seconds.
pub const TIC_SECONDS: f64 = 1.0 / TICRATE as f64;

/// Monotonic tick counter. Time is derived, never accumulated, so it does
/// not drift.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
}

impl SimClock {
    /// A clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one tick. Returns the new tick number.
    pub fn advance(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Elapsed simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.tick as f64 / f64::from(TICRATE)
    }

    /// Length of one tick in seconds, as `f32` for per-tick integration.
    pub fn dt(&self) -> f32 {
        TIC_SECONDS as f32
    }

    /// Back to tick 0, for a fresh level.
    pub fn reset(&mut self) {
        self.tick = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_initial_state() {
        let clock = SimClock::new();
        assert_eq!(clock.tick(), 0);
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn clock_advance_increments() {
        let mut clock = SimClock::new();
        clock.advance();
        clock.advance();
        assert_eq!(clock.advance(), 3);
        assert!((clock.time() - 3.0 / 35.0).abs() < 1e-12);
    }

    #[test]
    fn thirty_five_ticks_is_one_second() {
        let mut clock = SimClock::new();
        for _ in 0..TICRATE {
            clock.advance();
        }
        assert_eq!(clock.time(), 1.0);
        clock.reset();
        assert_eq!(clock.tick(), 0);
    }
}
