//! Input latching and control-line-2 output behaviour.

use crate::control_lines::{ControlLines, Line2Mode};
use crate::port::Port;
use crate::registers::{PortSide, Registers};
use crate::shifter::ShiftMode;

/// Input latch and CA2/CB2 output state for one port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub(crate) struct Latches {
    side: PortSide,
    /// A data access started a handshake that has not finished yet.
    handshake_active: bool,
    /// Cycles since the handshake began.
    cycles: u8,
}

impl Latches {
    pub(crate) fn new(side: PortSide) -> Self {
        Self {
            side,
            handshake_active: false,
            cycles: 0,
        }
    }

    pub(crate) fn side(&self) -> PortSide {
        self.side
    }

    pub(crate) fn is_latching_enabled(&self, acr: u8) -> bool {
        acr & self.side.latch_enable_mask() != 0
    }

    /// Capture the input pins into IRA/IRB on control line 1's active edge.
    pub(crate) fn latch_port(&self, regs: &mut Registers, port: &Port, control: &ControlLines) {
        if self.is_latching_enabled(regs.acr) && control.check_transitioned(0, regs.pcr) {
            let pins = port.read_pins(regs.ddr(self.side));
            regs.set_input(self.side, pins);
        }
    }

    pub(crate) fn output_mode(&self, pcr: u8) -> Line2Mode {
        Line2Mode::from_pcr(self.side, pcr)
    }

    pub(crate) fn init_handshake(&mut self) {
        self.handshake_active = true;
        self.cycles = 0;
    }

    /// Drive control line 2 for this cycle.
    ///
    /// CB2 belongs to the shift register whenever a shift mode is selected,
    /// so port B leaves it alone then.
    pub(crate) fn set_output(&mut self, regs: &Registers, control: &ControlLines) {
        if self.side == PortSide::B && ShiftMode::from_acr(regs.acr) != ShiftMode::Disabled {
            return;
        }
        let level = match self.output_mode(regs.pcr) {
            Line2Mode::Input { .. } => return,
            Line2Mode::FixedLow => false,
            Line2Mode::FixedHigh => true,
            Line2Mode::Handshake => {
                if self.handshake_active && control.check_transitioned(0, regs.pcr) {
                    self.handshake_active = false;
                }
                !self.handshake_active
            }
            Line2Mode::Pulse => {
                if self.handshake_active && self.cycles > 0 {
                    self.handshake_active = false;
                }
                self.cycles = self.cycles.saturating_add(1);
                !self.handshake_active
            }
        };
        control.lines[1].set_enable(level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emu_core::{Bus8, Line};

    struct Rig {
        latches: Latches,
        control: ControlLines,
        l1: Line,
        l2: Line,
    }

    fn rig(pcr: u8) -> (Rig, Registers) {
        let mut control = ControlLines::new(PortSide::A);
        let l1 = Line::new();
        let l2 = Line::with_level(true);
        control.lines[0].connect(&l1);
        control.lines[1].connect(&l2);
        control.store_previous_values();
        let regs = Registers {
            pcr,
            ..Registers::default()
        };
        (
            Rig {
                latches: Latches::new(PortSide::A),
                control,
                l1,
                l2,
            },
            regs,
        )
    }

    #[test]
    fn handshake_holds_until_line1_edge() {
        let (mut rig, regs) = rig(0x09);
        rig.latches.init_handshake();
        for _ in 0..5 {
            rig.latches.set_output(&regs, &rig.control);
            rig.control.store_previous_values();
            assert!(!rig.l2.status());
        }
        rig.l1.set(true);
        rig.latches.set_output(&regs, &rig.control);
        assert!(rig.l2.status());
    }

    #[test]
    fn pulse_lasts_one_cycle() {
        let (mut rig, regs) = rig(0x0A);
        rig.latches.init_handshake();
        rig.latches.set_output(&regs, &rig.control);
        assert!(!rig.l2.status());
        rig.latches.set_output(&regs, &rig.control);
        assert!(rig.l2.status());
        rig.latches.set_output(&regs, &rig.control);
        assert!(rig.l2.status());
    }

    #[test]
    fn fixed_modes_ignore_line1() {
        let (mut rig, mut regs) = rig(0x0C);
        rig.latches.set_output(&regs, &rig.control);
        assert!(!rig.l2.status());
        rig.l1.set(true);
        rig.latches.set_output(&regs, &rig.control);
        assert!(!rig.l2.status());
        regs.pcr = 0x0E;
        rig.latches.set_output(&regs, &rig.control);
        assert!(rig.l2.status());
    }

    #[test]
    fn latches_inputs_on_active_edge_only() {
        let (rig, mut regs) = rig(0x01);
        let bus = Bus8::new();
        let mut port = Port::new(PortSide::A);
        port.pins.connect(&bus);
        regs.acr = 0x01;
        regs.ddra = 0x0F;
        bus.write(0xA5);

        rig.latches.latch_port(&mut regs, &port, &rig.control);
        assert_eq!(regs.ira, 0);

        rig.l1.set(true);
        rig.latches.latch_port(&mut regs, &port, &rig.control);
        assert_eq!(regs.ira, 0xA0);
    }
}
