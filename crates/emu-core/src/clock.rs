//! The board clock and the per-step context handed to every chip.

use std::time::Duration;

use crate::Ticks;

/// Crystal driving the board.
///
/// All 65xx parts on the board share one phase-2 clock, so the crystal
/// frequency is also the cycle rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MasterClock {
    /// Crystal frequency in Hz (e.g., `1_000_000` for a 1 MHz board).
    pub frequency_hz: u64,
}

impl MasterClock {
    #[must_use]
    pub const fn new(frequency_hz: u64) -> Self {
        Self { frequency_hz }
    }

    /// Emulated wall time at the start of `cycle`.
    ///
    /// A zero-frequency clock never advances.
    #[must_use]
    pub fn time_at(&self, cycle: Ticks) -> Duration {
        if self.frequency_hz == 0 {
            return Duration::ZERO;
        }
        let nanos = u128::from(cycle.get()) * 1_000_000_000 / u128::from(self.frequency_hz);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Cycles in one second of emulated time.
    #[must_use]
    pub const fn cycles_per_second(&self) -> Ticks {
        Ticks::new(self.frequency_hz)
    }
}

/// What a chip is told about the cycle it is being stepped through.
///
/// Chips treat this as opaque bookkeeping: it only feeds logging and
/// diagnostics, never behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StepContext {
    /// Index of the cycle being executed.
    pub cycle: Ticks,
    /// Emulated time at the start of the cycle.
    pub timestamp: Duration,
}

impl StepContext {
    #[must_use]
    pub const fn new(cycle: Ticks, timestamp: Duration) -> Self {
        Self { cycle, timestamp }
    }
}

/// Running clock: hands out one [`StepContext`] per cycle.
#[derive(Debug, Clone)]
pub struct Clock {
    master: MasterClock,
    cycle: Ticks,
}

impl Clock {
    #[must_use]
    pub const fn new(master: MasterClock) -> Self {
        Self {
            master,
            cycle: Ticks::ZERO,
        }
    }

    #[must_use]
    pub const fn master(&self) -> MasterClock {
        self.master
    }

    /// Number of cycles handed out so far.
    #[must_use]
    pub const fn elapsed(&self) -> Ticks {
        self.cycle
    }

    /// Context for the next cycle; advances the clock.
    pub fn step(&mut self) -> StepContext {
        let step = StepContext::new(self.cycle, self.master.time_at(self.cycle));
        self.cycle = self.cycle.next();
        step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_megahertz_cycles_are_a_microsecond() {
        let clock = MasterClock::new(1_000_000);
        assert_eq!(clock.time_at(Ticks::new(0)), Duration::ZERO);
        assert_eq!(clock.time_at(Ticks::new(1)), Duration::from_micros(1));
        assert_eq!(clock.time_at(Ticks::new(2_500_000)), Duration::from_millis(2500));
    }

    #[test]
    fn zero_frequency_does_not_divide_by_zero() {
        assert_eq!(MasterClock::new(0).time_at(Ticks::new(10)), Duration::ZERO);
    }

    #[test]
    fn clock_steps_are_consecutive() {
        let mut clock = Clock::new(MasterClock::new(2_000_000));
        let first = clock.step();
        let second = clock.step();
        assert_eq!(first.cycle, Ticks::new(0));
        assert_eq!(second.cycle, Ticks::new(1));
        assert_eq!(second.timestamp, Duration::from_nanos(500));
        assert_eq!(clock.elapsed(), Ticks::new(2));
    }
}
