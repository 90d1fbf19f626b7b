//! Register block and register-select decoding.

use crate::error::ViaError;
use crate::interrupts::{self, InterruptFlags};

/// The sixteen addressable registers, in register-select order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// Port B data (IRB on read, ORB on write).
    Orb = 0x0,
    /// Port A data, with handshake.
    Ora = 0x1,
    Ddrb = 0x2,
    Ddra = 0x3,
    /// T1 counter low on read, T1 low latch on write.
    T1CounterLow = 0x4,
    /// T1 counter high; writing loads and starts T1.
    T1CounterHigh = 0x5,
    T1LatchLow = 0x6,
    T1LatchHigh = 0x7,
    /// T2 counter low on read, T2 low latch on write.
    T2CounterLow = 0x8,
    /// T2 counter high; writing loads and starts T2.
    T2CounterHigh = 0x9,
    ShiftRegister = 0xA,
    Acr = 0xB,
    Pcr = 0xC,
    Ifr = 0xD,
    Ier = 0xE,
    /// Port A data without handshake.
    OraNoHandshake = 0xF,
}

impl Register {
    const ALL: [Register; 16] = [
        Register::Orb,
        Register::Ora,
        Register::Ddrb,
        Register::Ddra,
        Register::T1CounterLow,
        Register::T1CounterHigh,
        Register::T1LatchLow,
        Register::T1LatchHigh,
        Register::T2CounterLow,
        Register::T2CounterHigh,
        Register::ShiftRegister,
        Register::Acr,
        Register::Pcr,
        Register::Ifr,
        Register::Ier,
        Register::OraNoHandshake,
    ];

    /// Decode the four register-select lines. Higher bits are ignored, so
    /// every input maps to a register.
    #[must_use]
    pub const fn from_select(select: u8) -> Self {
        Self::ALL[(select & 0x0F) as usize]
    }

    #[must_use]
    pub const fn select(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Register {
    type Error = ViaError;

    fn try_from(select: u8) -> Result<Self, Self::Error> {
        if select > 0x0F {
            return Err(ViaError::InvalidRegister(select));
        }
        Ok(Self::from_select(select))
    }
}

/// Which of the two peripheral ports (and its control lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PortSide {
    A,
    B,
}

impl PortSide {
    /// IFR bit raised by control line 1 (CA1/CB1).
    #[must_use]
    pub const fn line1_flag(self) -> u8 {
        match self {
            PortSide::A => interrupts::CA1,
            PortSide::B => interrupts::CB1,
        }
    }

    /// IFR bit raised by control line 2 (CA2/CB2).
    #[must_use]
    pub const fn line2_flag(self) -> u8 {
        match self {
            PortSide::A => interrupts::CA2,
            PortSide::B => interrupts::CB2,
        }
    }

    /// This port's four-bit field of the PCR (bits 0-3 for A, 4-7 for B).
    #[must_use]
    pub const fn pcr_field(self, pcr: u8) -> u8 {
        match self {
            PortSide::A => pcr & 0x0F,
            PortSide::B => pcr >> 4,
        }
    }

    /// ACR input-latch enable bit.
    #[must_use]
    pub const fn latch_enable_mask(self) -> u8 {
        match self {
            PortSide::A => 0x01,
            PortSide::B => 0x02,
        }
    }
}

/// Counter and latches of one interval timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerRegisters {
    pub counter: u16,
    pub low_latch: u8,
    pub high_latch: u8,
}

impl TimerRegisters {
    /// Both latches as one 16-bit reload value.
    #[must_use]
    pub const fn latch(&self) -> u16 {
        ((self.high_latch as u16) << 8) | self.low_latch as u16
    }

    #[must_use]
    pub const fn counter_low(&self) -> u8 {
        self.counter as u8
    }

    #[must_use]
    pub const fn counter_high(&self) -> u8 {
        (self.counter >> 8) as u8
    }
}

impl Default for TimerRegisters {
    fn default() -> Self {
        Self {
            counter: 0xFFFF,
            low_latch: 0xFF,
            high_latch: 0xFF,
        }
    }
}

/// Every register of the chip. Owned by the [`Via`](crate::Via); the
/// sub-machines borrow it for the duration of a call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Registers {
    pub ora: u8,
    pub orb: u8,
    pub ira: u8,
    pub irb: u8,
    pub ddra: u8,
    pub ddrb: u8,
    pub t1: TimerRegisters,
    pub t2: TimerRegisters,
    pub shift_register: u8,
    /// Auxiliary control register.
    ///
    /// Bit 7: PB7 driven by T1; bit 6: T1 free-run; bit 5: T2 counts PB6
    /// pulses; bits 4-2: shift register mode; bit 1: PB latch; bit 0: PA latch.
    pub acr: u8,
    /// Peripheral control register.
    ///
    /// Bits 7-5: CB2 control; bit 4: CB1 positive edge; bits 3-1: CA2
    /// control; bit 0: CA1 positive edge.
    pub pcr: u8,
    pub interrupts: InterruptFlags,
}

impl Registers {
    #[must_use]
    pub const fn output(&self, side: PortSide) -> u8 {
        match side {
            PortSide::A => self.ora,
            PortSide::B => self.orb,
        }
    }

    #[must_use]
    pub const fn input(&self, side: PortSide) -> u8 {
        match side {
            PortSide::A => self.ira,
            PortSide::B => self.irb,
        }
    }

    #[must_use]
    pub const fn ddr(&self, side: PortSide) -> u8 {
        match side {
            PortSide::A => self.ddra,
            PortSide::B => self.ddrb,
        }
    }

    pub fn set_input(&mut self, side: PortSide, value: u8) {
        match side {
            PortSide::A => self.ira = value,
            PortSide::B => self.irb = value,
        }
    }

    /// ACR bit 7: Timer 1 drives PB7.
    #[must_use]
    pub const fn pb7_driven_by_timer1(&self) -> bool {
        self.acr & 0x80 != 0
    }
}
