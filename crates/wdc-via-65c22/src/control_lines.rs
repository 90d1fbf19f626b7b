//! CA1/CA2 and CB1/CB2 edge detection.

use emu_core::EnabledHigh;

use crate::registers::{PortSide, Registers};

/// How the PCR configures control line 2 (CA2 or CB2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line2Mode {
    /// Input. `independent` leaves the flag set across data-register
    /// accesses.
    Input { positive_edge: bool, independent: bool },
    /// Low after a data access until control line 1 transitions.
    Handshake,
    /// Low for one cycle after a data access.
    Pulse,
    FixedLow,
    FixedHigh,
}

impl Line2Mode {
    #[must_use]
    pub const fn from_pcr(side: PortSide, pcr: u8) -> Self {
        match (side.pcr_field(pcr) >> 1) & 0x07 {
            0b000 => Line2Mode::Input { positive_edge: false, independent: false },
            0b001 => Line2Mode::Input { positive_edge: false, independent: true },
            0b010 => Line2Mode::Input { positive_edge: true, independent: false },
            0b011 => Line2Mode::Input { positive_edge: true, independent: true },
            0b100 => Line2Mode::Handshake,
            0b101 => Line2Mode::Pulse,
            0b110 => Line2Mode::FixedLow,
            _ => Line2Mode::FixedHigh,
        }
    }

    #[must_use]
    pub const fn is_input(self) -> bool {
        matches!(self, Line2Mode::Input { .. })
    }

    #[must_use]
    pub const fn is_independent_interrupt(self) -> bool {
        matches!(self, Line2Mode::Input { independent: true, .. })
    }

    /// Modes in which a data-register access starts a handshake.
    #[must_use]
    pub const fn is_handshake(self) -> bool {
        matches!(self, Line2Mode::Handshake | Line2Mode::Pulse)
    }
}

/// The two control lines of one port.
#[derive(Debug)]
pub(crate) struct ControlLines {
    side: PortSide,
    pub(crate) lines: [EnabledHigh; 2],
    previous: [bool; 2],
}

impl ControlLines {
    pub(crate) fn new(side: PortSide) -> Self {
        Self {
            side,
            lines: [EnabledHigh::new(), EnabledHigh::new()],
            previous: [false; 2],
        }
    }

    pub(crate) fn previous(&self) -> [bool; 2] {
        self.previous
    }

    pub(crate) fn restore_previous(&mut self, previous: [bool; 2]) {
        self.previous = previous;
    }

    /// Active edge for line `i` (0 = CA1/CB1, 1 = CA2/CB2).
    pub(crate) fn config_for_positive_edge(&self, i: usize, pcr: u8) -> bool {
        if i == 0 {
            self.side.pcr_field(pcr) & 0x01 != 0
        } else {
            matches!(Line2Mode::from_pcr(self.side, pcr), Line2Mode::Input { positive_edge: true, .. })
        }
    }

    /// True on the cycle line `i` made its configured transition.
    pub(crate) fn check_transitioned(&self, i: usize, pcr: u8) -> bool {
        let now = self.lines[i].enabled();
        let before = self.previous[i];
        if self.config_for_positive_edge(i, pcr) {
            !before && now
        } else {
            before && !now
        }
    }

    /// Raise IFR bits for lines that made their active transition. Line 2
    /// only raises its flag while it is configured as an input.
    pub(crate) fn set_interrupt_flag_on_transition(&self, regs: &mut Registers) {
        if self.check_transitioned(0, regs.pcr) {
            regs.interrupts.set_flag(self.side.line1_flag());
        }
        if Line2Mode::from_pcr(self.side, regs.pcr).is_input() && self.check_transitioned(1, regs.pcr) {
            regs.interrupts.set_flag(self.side.line2_flag());
        }
    }

    /// Must run once per cycle, after every `check_transitioned` caller.
    pub(crate) fn store_previous_values(&mut self) {
        self.previous = [self.lines[0].enabled(), self.lines[1].enabled()];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interrupts;
    use emu_core::Line;

    fn wired(side: PortSide) -> (ControlLines, Line, Line) {
        let mut control = ControlLines::new(side);
        let l1 = Line::new();
        let l2 = Line::new();
        control.lines[0].connect(&l1);
        control.lines[1].connect(&l2);
        (control, l1, l2)
    }

    #[test]
    fn decodes_line2_modes() {
        assert_eq!(Line2Mode::from_pcr(PortSide::A, 0x08), Line2Mode::Handshake);
        assert_eq!(Line2Mode::from_pcr(PortSide::A, 0x0A), Line2Mode::Pulse);
        assert_eq!(Line2Mode::from_pcr(PortSide::B, 0xC0), Line2Mode::FixedLow);
        assert_eq!(Line2Mode::from_pcr(PortSide::B, 0xE0), Line2Mode::FixedHigh);
        assert!(Line2Mode::from_pcr(PortSide::A, 0x02).is_independent_interrupt());
        assert!(!Line2Mode::from_pcr(PortSide::A, 0x04).is_independent_interrupt());
    }

    #[test]
    fn negative_edge_by_default() {
        let (mut control, l1, _) = wired(PortSide::A);
        l1.set(true);
        control.store_previous_values();
        assert!(!control.check_transitioned(0, 0x00));
        l1.set(false);
        assert!(control.check_transitioned(0, 0x00));
        assert!(!control.check_transitioned(0, 0x01));
    }

    #[test]
    fn positive_edge_raises_flag_once() {
        let (mut control, l1, _) = wired(PortSide::B);
        let mut regs = Registers {
            pcr: 0x10,
            ..Registers::default()
        };
        control.store_previous_values();
        l1.set(true);
        control.set_interrupt_flag_on_transition(&mut regs);
        assert!(regs.interrupts.is_set(interrupts::CB1));

        control.store_previous_values();
        regs.interrupts.clear_flag(interrupts::CB1);
        control.set_interrupt_flag_on_transition(&mut regs);
        assert!(!regs.interrupts.is_set(interrupts::CB1));
    }

    #[test]
    fn line2_output_modes_do_not_raise_flags() {
        let (mut control, _, l2) = wired(PortSide::A);
        let mut regs = Registers {
            pcr: 0x0E,
            ..Registers::default()
        };
        l2.set(true);
        control.store_previous_values();
        l2.set(false);
        control.set_interrupt_flag_on_transition(&mut regs);
        assert!(!regs.interrupts.is_set(interrupts::CA2));

        regs.pcr = 0x00;
        control.set_interrupt_flag_on_transition(&mut regs);
        assert!(regs.interrupts.is_set(interrupts::CA2));
    }
}
