//! Peripheral ports A and B.

use emu_core::BusConnector;

use crate::control_lines::Line2Mode;
use crate::registers::{PortSide, Registers};

/// One 8-bit peripheral port and its pins.
#[derive(Debug)]
pub(crate) struct Port {
    side: PortSide,
    pub(crate) pins: BusConnector<u8>,
}

impl Port {
    pub(crate) fn new(side: PortSide) -> Self {
        Self {
            side,
            pins: BusConnector::new(),
        }
    }

    /// Levels on the input pins. Output bits read as 0; the caller merges
    /// them back in from the output register.
    pub(crate) fn read_pins(&self, ddr: u8) -> u8 {
        self.pins.read() & !ddr
    }

    /// Level of a single pin regardless of direction.
    pub(crate) fn pin(&self, n: u8) -> bool {
        self.pins.read() & (1 << n) != 0
    }

    /// Drive every output bit (`ddr` = 1) from `or`. Input bits keep
    /// whatever another device put on the bus.
    pub(crate) fn write_output_register(&self, or: u8, ddr: u8) {
        if !self.pins.is_connected() {
            return;
        }
        let driven = (self.pins.read() & !ddr) | (or & ddr);
        self.pins.write(driven);
    }

    /// Side effect of any access to this port's data register.
    ///
    /// Control line 1's flag is always cleared. Line 2's flag survives only
    /// when the PCR makes it an independent interrupt input.
    pub(crate) fn clear_control_lines_interrupt_flag_on_rw(&self, regs: &mut Registers) {
        let mut mask = self.side.line1_flag();
        if !Line2Mode::from_pcr(self.side, regs.pcr).is_independent_interrupt() {
            mask |= self.side.line2_flag();
        }
        regs.interrupts.clear_flag(mask);
    }
}
