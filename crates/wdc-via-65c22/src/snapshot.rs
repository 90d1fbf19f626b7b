//! Save and restore of the chip's internal state.
//!
//! Pin wiring is not part of a snapshot. Restoring into a chip keeps its
//! current connections.

use crate::error::{Result, ViaError};
use crate::interrupts::InterruptFlags;
use crate::latches::Latches;
use crate::registers::{PortSide, Registers};
use crate::shifter::Shifter;
use crate::timer::{Timer, TimerId};
use crate::via::Via;

/// Everything a [`Via`] needs to resume from the same cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViaSnapshot {
    registers: Registers,
    timer1: Timer,
    timer2: Timer,
    shifter: Shifter,
    latches_a: Latches,
    latches_b: Latches,
    /// Control line levels seen on the last cycle, for edge detection.
    previous_a: [bool; 2],
    previous_b: [bool; 2],
}

impl ViaSnapshot {
    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.registers
    }
}

impl Via {
    #[must_use]
    pub fn snapshot(&self) -> ViaSnapshot {
        ViaSnapshot {
            registers: self.regs.clone(),
            timer1: self.timer1,
            timer2: self.timer2,
            shifter: self.shifter,
            latches_a: self.latches_a,
            latches_b: self.latches_b,
            previous_a: self.control_a.previous(),
            previous_b: self.control_b.previous(),
        }
    }

    /// Replace all internal state with `snapshot`. On error the chip is left
    /// untouched.
    pub fn restore(&mut self, snapshot: &ViaSnapshot) -> Result<()> {
        snapshot.shifter.validate()?;
        if snapshot.timer1.id() != TimerId::One || snapshot.timer2.id() != TimerId::Two {
            return Err(ViaError::InvalidSnapshot("timer slots swapped"));
        }
        if snapshot.latches_a.side() != PortSide::A || snapshot.latches_b.side() != PortSide::B {
            return Err(ViaError::InvalidSnapshot("port latch slots swapped"));
        }

        self.regs = snapshot.registers.clone();
        // Bit 7 of the IFR is never taken on trust.
        let ifr = &snapshot.registers.interrupts;
        self.regs.interrupts = InterruptFlags::from_raw(ifr.flags(), ifr.enable());
        self.timer1 = snapshot.timer1;
        self.timer2 = snapshot.timer2;
        self.shifter = snapshot.shifter;
        self.latches_a = snapshot.latches_a;
        self.latches_b = snapshot.latches_b;
        self.control_a.restore_previous(snapshot.previous_a);
        self.control_b.restore_previous(snapshot.previous_b);
        Ok(())
    }
}
