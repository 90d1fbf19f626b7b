//! Serial shift register on CB1 (clock) and CB2 (data).
//!
//! A shift clock period has two phases. CB1 is low during the shifting
//! phase; the register moves one bit on the first cycle of that phase and
//! waits for the phase to end before the next bit. The clock comes from T2's
//! low byte, from the system clock, or from an external device on CB1.

use crate::control_lines::ControlLines;
use crate::error::{Result, ViaError};
use crate::interrupts;
use crate::registers::Registers;
use crate::timer::Timer;

/// ACR bits 4-2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMode {
    Disabled,
    InTimer2,
    InClock,
    InExternal,
    /// Shift out forever at the T2 rate; never completes.
    OutFreeRunning,
    OutTimer2,
    OutClock,
    OutExternal,
}

/// Where the shift clock comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftClock {
    Timer2,
    System,
    External,
}

impl ShiftMode {
    #[must_use]
    pub const fn from_acr(acr: u8) -> Self {
        match (acr >> 2) & 0x07 {
            0b000 => ShiftMode::Disabled,
            0b001 => ShiftMode::InTimer2,
            0b010 => ShiftMode::InClock,
            0b011 => ShiftMode::InExternal,
            0b100 => ShiftMode::OutFreeRunning,
            0b101 => ShiftMode::OutTimer2,
            0b110 => ShiftMode::OutClock,
            _ => ShiftMode::OutExternal,
        }
    }

    #[must_use]
    pub const fn is_shift_out(self) -> bool {
        matches!(
            self,
            ShiftMode::OutFreeRunning | ShiftMode::OutTimer2 | ShiftMode::OutClock | ShiftMode::OutExternal
        )
    }

    /// `None` when disabled.
    #[must_use]
    pub const fn clock(self) -> Option<ShiftClock> {
        match self {
            ShiftMode::Disabled => None,
            ShiftMode::InTimer2 | ShiftMode::OutTimer2 | ShiftMode::OutFreeRunning => Some(ShiftClock::Timer2),
            ShiftMode::InClock | ShiftMode::OutClock => Some(ShiftClock::System),
            ShiftMode::InExternal | ShiftMode::OutExternal => Some(ShiftClock::External),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Shifter {
    enabled: bool,
    bit_count: u8,
    /// CB1-low half of the shift clock.
    shifting_phase: bool,
    /// A bit has already moved during the current shifting phase.
    bit_shifted: bool,
    /// Last bit shifted out, held on CB2.
    output_bit: bool,
    /// Cycles left before an internal clock starts after re-arming.
    preparing: u8,
}

impl Shifter {
    pub(crate) fn new() -> Self {
        Self {
            enabled: false,
            bit_count: 0,
            shifting_phase: false,
            bit_shifted: false,
            output_bit: false,
            preparing: 0,
        }
    }

    pub(crate) fn enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Reject states the shift clock can never reach.
    pub(crate) fn validate(&self) -> Result<()> {
        if self.bit_count > 8 {
            return Err(ViaError::InvalidSnapshot("shift register bit count above 8"));
        }
        if self.preparing > 1 {
            return Err(ViaError::InvalidSnapshot("shift clock preparation count above 1"));
        }
        Ok(())
    }

    /// Any access to the shift register starts a fresh eight-bit transfer.
    pub(crate) fn rearm(&mut self) {
        self.enabled = true;
        self.bit_count = 0;
        self.shifting_phase = false;
        self.bit_shifted = false;
        self.preparing = 1;
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
        self.shifting_phase = false;
        self.bit_shifted = false;
        self.preparing = 0;
    }

    #[cfg(test)]
    pub(crate) fn corrupt_for_test() -> Self {
        Self {
            bit_count: 9,
            ..Self::new()
        }
    }

    #[cfg(test)]
    pub(crate) fn stuck_preparing_for_test() -> Self {
        Self {
            preparing: 2,
            ..Self::new()
        }
    }

    /// Move one bit if this is the first cycle of a shifting phase.
    pub(crate) fn tick(&mut self, regs: &mut Registers, cb: &ControlLines) {
        let mode = ShiftMode::from_acr(regs.acr);
        if !self.enabled || mode == ShiftMode::Disabled {
            return;
        }
        if !self.shifting_phase {
            self.bit_shifted = false;
            return;
        }
        if self.bit_shifted {
            return;
        }

        let sr = regs.shift_register;
        if mode.is_shift_out() {
            self.output_bit = sr & 0x80 != 0;
            regs.shift_register = sr.rotate_left(1);
        } else {
            regs.shift_register = (sr << 1) | u8::from(cb.lines[1].enabled());
        }
        self.bit_shifted = true;
        self.bit_count += 1;
    }

    /// Advance the shift clock and drive CB1/CB2. Returns true when the
    /// transfer completed this cycle.
    pub(crate) fn set_control_lines_based_on_status(
        &mut self,
        regs: &mut Registers,
        timer2: &Timer,
        cb: &ControlLines,
    ) -> bool {
        let mode = ShiftMode::from_acr(regs.acr);
        let Some(clock) = mode.clock() else {
            return false;
        };

        match clock {
            ShiftClock::External => self.shifting_phase = !cb.lines[0].enabled(),
            _ if !self.enabled => {}
            _ if self.preparing > 0 => self.preparing -= 1,
            ShiftClock::System => self.shifting_phase = !self.shifting_phase,
            ShiftClock::Timer2 => {
                if timer2.counted_to_zero_low() {
                    self.shifting_phase = !self.shifting_phase;
                    regs.t2.counter = (regs.t2.counter & 0xFF00) | u16::from(regs.t2.low_latch);
                }
            }
        }

        let drive_cb1 = clock != ShiftClock::External;
        if drive_cb1 {
            cb.lines[0].set_enable(!(self.enabled && self.shifting_phase));
        }
        if mode.is_shift_out() {
            cb.lines[1].set_enable(self.output_bit);
        }
        self.enabled && self.check_bit_counter(regs, cb, mode, drive_cb1)
    }

    /// Finish the transfer once the eighth bit's shifting phase has ended.
    fn check_bit_counter(&mut self, regs: &mut Registers, cb: &ControlLines, mode: ShiftMode, drive_cb1: bool) -> bool {
        if self.bit_count < 8 || self.shifting_phase {
            return false;
        }
        if mode == ShiftMode::OutFreeRunning {
            self.bit_count = 0;
            return false;
        }
        self.enabled = false;
        regs.interrupts.set_flag(interrupts::SR);
        if drive_cb1 {
            cb.lines[0].set_enable(true);
        }
        true
    }
}
