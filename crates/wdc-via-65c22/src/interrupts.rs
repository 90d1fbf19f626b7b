//! Interrupt flag and enable registers (IFR/IER).

/// CA2 active edge.
pub const CA2: u8 = 0x01;
/// CA1 active edge.
pub const CA1: u8 = 0x02;
/// Shift register completed eight shifts.
pub const SR: u8 = 0x04;
/// CB2 active edge.
pub const CB2: u8 = 0x08;
/// CB1 active edge.
pub const CB1: u8 = 0x10;
/// Timer 2 counted to zero.
pub const T2: u8 = 0x20;
/// Timer 1 counted to zero.
pub const T1: u8 = 0x40;
/// Composite: any enabled flag is set.
pub const IRQ: u8 = 0x80;

const SOURCES: u8 = 0x7F;

/// IFR plus IER.
///
/// Bit 7 of the flag register is never stored independently: it is derived
/// from the other flags and the enable mask after every change, so it always
/// equals `flags & enable & 0x7F != 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterruptFlags {
    flags: u8,
    enable: u8,
}

impl InterruptFlags {
    #[must_use]
    pub const fn new() -> Self {
        Self { flags: 0, enable: 0 }
    }

    /// Build from raw register contents; bit 7 of `flags` is recomputed.
    #[must_use]
    pub fn from_raw(flags: u8, enable: u8) -> Self {
        let mut ifr = Self {
            flags,
            enable: enable & SOURCES,
        };
        ifr.update();
        ifr
    }

    /// Raw contents with no recomputation of bit 7.
    #[cfg(test)]
    pub(crate) const fn unchecked_for_test(flags: u8, enable: u8) -> Self {
        Self { flags, enable }
    }

    /// IFR as read by the CPU, composite bit included.
    #[must_use]
    pub const fn flags(&self) -> u8 {
        self.flags
    }

    /// Enable mask, bits 0-6.
    #[must_use]
    pub const fn enable(&self) -> u8 {
        self.enable
    }

    /// IER as read by the CPU: bit 7 always reads 1.
    #[must_use]
    pub const fn read_enable(&self) -> u8 {
        self.enable | 0x80
    }

    /// True when the chip should pull IRQ low.
    #[must_use]
    pub const fn irq(&self) -> bool {
        self.flags & IRQ != 0
    }

    #[must_use]
    pub const fn is_set(&self, mask: u8) -> bool {
        self.flags & mask & SOURCES != 0
    }

    pub fn set_flag(&mut self, mask: u8) {
        self.flags |= mask & SOURCES;
        self.update();
    }

    pub fn clear_flag(&mut self, mask: u8) {
        self.flags &= !(mask & SOURCES);
        self.update();
    }

    /// IER write: bit 7 set enables the sources written as 1, bit 7 clear
    /// disables them.
    pub fn set_enable(&mut self, value: u8) {
        if value & 0x80 != 0 {
            self.enable |= value & SOURCES;
        } else {
            self.enable &= !(value & SOURCES);
        }
        self.update();
    }

    /// IFR write: every source written as 1 is cleared. Bit 7 is ignored.
    pub fn write_flags(&mut self, value: u8) {
        self.clear_flag(value);
    }

    fn update(&mut self) {
        if self.flags & self.enable & SOURCES != 0 {
            self.flags |= IRQ;
        } else {
            self.flags &= !IRQ;
        }
    }
}
