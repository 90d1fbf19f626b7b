//! Interval timers T1 and T2.
//!
//! Both counters decrement every cycle whether or not the timer is armed;
//! arming only decides whether the next roll-over raises an interrupt. The
//! roll-over instant is the decrement that leaves the counter at `0xFFFE`,
//! one cycle after it passed through zero.

use emu_core::BusConnector;

use crate::interrupts;
use crate::registers::{Registers, TimerRegisters};

const ROLL_OVER: u16 = 0xFFFE;
const ROLL_OVER_LOW: u8 = 0xFE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimerId {
    One,
    Two,
}

/// Run mode selected by the ACR.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    /// Interrupt once, then keep counting silently.
    OneShot,
    /// T1 only: reload from the latches at every roll-over.
    FreeRun,
    /// T2 only: count while PB6 is low.
    PulseCounting,
}

impl TimerMode {
    #[must_use]
    pub const fn from_acr(id: TimerId, acr: u8) -> Self {
        match id {
            TimerId::One if acr & 0x40 != 0 => TimerMode::FreeRun,
            TimerId::Two if acr & 0x20 != 0 => TimerMode::PulseCounting,
            _ => TimerMode::OneShot,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Timer {
    id: TimerId,
    /// Armed: the next roll-over raises the interrupt flag.
    enabled: bool,
    /// PB7 level while armed (T1 only).
    pb7_output_latched_high: bool,
    counted_to_zero: bool,
    counted_to_zero_low: bool,
}

impl Timer {
    pub(crate) fn new(id: TimerId) -> Self {
        Self {
            id,
            enabled: false,
            pb7_output_latched_high: false,
            counted_to_zero: false,
            counted_to_zero_low: false,
        }
    }

    pub(crate) fn id(&self) -> TimerId {
        self.id
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    /// The low byte rolled over this cycle. Drives the shift clock in the
    /// T2-rate shift modes.
    pub(crate) fn counted_to_zero_low(&self) -> bool {
        self.counted_to_zero_low
    }

    pub(crate) fn flag(&self) -> u8 {
        match self.id {
            TimerId::One => interrupts::T1,
            TimerId::Two => interrupts::T2,
        }
    }

    pub(crate) fn mode(&self, acr: u8) -> TimerMode {
        TimerMode::from_acr(self.id, acr)
    }

    fn registers<'a>(&self, regs: &'a mut Registers) -> &'a mut TimerRegisters {
        match self.id {
            TimerId::One => &mut regs.t1,
            TimerId::Two => &mut regs.t2,
        }
    }

    /// Advance one cycle. Returns true when this cycle's roll-over raised
    /// the interrupt flag.
    pub(crate) fn tick(&mut self, regs: &mut Registers, pb6_high: bool) -> bool {
        let mode = self.mode(regs.acr);
        self.counted_to_zero = false;
        self.counted_to_zero_low = false;
        if mode == TimerMode::PulseCounting && pb6_high {
            return false;
        }

        let timer = self.registers(regs);
        timer.counter = timer.counter.wrapping_sub(1);
        self.counted_to_zero_low = timer.counter_low() == ROLL_OVER_LOW;
        self.counted_to_zero = timer.counter == ROLL_OVER;
        if !self.counted_to_zero {
            return false;
        }

        let fired = self.enabled;
        match mode {
            TimerMode::FreeRun => {
                timer.counter = timer.latch();
                if self.enabled {
                    self.pb7_output_latched_high = !self.pb7_output_latched_high;
                }
            }
            TimerMode::OneShot | TimerMode::PulseCounting => self.enabled = false,
        }
        if fired {
            regs.interrupts.set_flag(self.flag());
        }
        fired
    }

    /// Counter-high write: load the counter from `value` and the low latch,
    /// arm, and clear the interrupt flag.
    pub(crate) fn write_counter_high(&mut self, regs: &mut Registers, value: u8) {
        let timer = self.registers(regs);
        timer.high_latch = value;
        timer.counter = timer.latch();
        self.enabled = true;
        self.pb7_output_latched_high = false;
        regs.interrupts.clear_flag(self.flag());
    }

    /// PB7 level Timer 1 produces: high while idle, otherwise the latched
    /// toggle state.
    pub(crate) fn pb7_level(&self) -> bool {
        !self.enabled || self.pb7_output_latched_high
    }

    /// Drive PB7 when the ACR hands it to Timer 1. Timer 2 has no output.
    pub(crate) fn set_control_line_based_on_status(&self, regs: &Registers, port_b: &BusConnector<u8>) {
        if self.id == TimerId::One && regs.pb7_driven_by_timer1() {
            port_b.set_bit(7, self.pb7_level());
        }
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
        self.counted_to_zero = false;
        self.counted_to_zero_low = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn armed(id: TimerId, acr: u8, low: u8, high: u8) -> (Timer, Registers) {
        let mut regs = Registers {
            acr,
            ..Registers::default()
        };
        let mut timer = Timer::new(id);
        match id {
            TimerId::One => regs.t1.low_latch = low,
            TimerId::Two => regs.t2.low_latch = low,
        }
        timer.write_counter_high(&mut regs, high);
        (timer, regs)
    }

    #[test]
    fn one_shot_rolls_over_at_fffe() {
        let (mut timer, mut regs) = armed(TimerId::One, 0x00, 3, 0);
        assert_eq!(regs.t1.counter, 3);
        for expected in [2, 1, 0, 0xFFFF] {
            assert!(!timer.tick(&mut regs, true));
            assert_eq!(regs.t1.counter, expected);
        }
        assert!(timer.tick(&mut regs, true));
        assert_eq!(regs.t1.counter, 0xFFFE);
        assert!(regs.interrupts.is_set(interrupts::T1));
        assert!(!timer.enabled());
    }

    #[test]
    fn one_shot_interrupts_once() {
        let (mut timer, mut regs) = armed(TimerId::Two, 0x00, 0, 0);
        for _ in 0..2 {
            timer.tick(&mut regs, true);
        }
        assert!(regs.interrupts.is_set(interrupts::T2));
        regs.interrupts.clear_flag(interrupts::T2);
        for _ in 0..0x1_0001 {
            assert!(!timer.tick(&mut regs, true));
        }
        assert!(!regs.interrupts.is_set(interrupts::T2));
    }

    #[test]
    fn free_run_reloads_and_toggles_pb7() {
        let (mut timer, mut regs) = armed(TimerId::One, 0xC0, 1, 0);
        assert!(!timer.pb7_level());
        for _ in 0..2 {
            timer.tick(&mut regs, true);
        }
        assert!(timer.tick(&mut regs, true));
        assert_eq!(regs.t1.counter, 1);
        assert!(timer.pb7_level());
        assert!(timer.enabled());
        for _ in 0..3 {
            timer.tick(&mut regs, true);
        }
        assert!(!timer.pb7_level());
    }

    #[test]
    fn pulse_counting_holds_while_pb6_high() {
        let (mut timer, mut regs) = armed(TimerId::Two, 0x20, 5, 0);
        timer.tick(&mut regs, true);
        timer.tick(&mut regs, true);
        assert_eq!(regs.t2.counter, 5);
        timer.tick(&mut regs, false);
        assert_eq!(regs.t2.counter, 4);
    }

    #[test]
    fn low_byte_roll_over_is_flagged() {
        let (mut timer, mut regs) = armed(TimerId::Two, 0x00, 0x01, 0x05);
        timer.tick(&mut regs, true);
        timer.tick(&mut regs, true);
        assert!(!timer.counted_to_zero_low());
        timer.tick(&mut regs, true);
        assert_eq!(regs.t2.counter, 0x04FE);
        assert!(timer.counted_to_zero_low());
    }
}
