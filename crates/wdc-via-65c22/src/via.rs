//! The chip: pins, register dispatch and the per-cycle sequence.

use emu_core::{BusConnector, EnabledHigh, EnabledLow, Observable, StepContext, Tickable, Value};
use tracing::{debug, trace};

use crate::control_lines::ControlLines;
use crate::interrupts::{self, InterruptFlags};
use crate::latches::Latches;
use crate::port::Port;
use crate::registers::{PortSide, Register, Registers};
use crate::shifter::Shifter;
use crate::timer::{Timer, TimerId};

/// Bus-side pins of the chip.
#[derive(Debug, Default)]
pub struct ViaPins {
    /// CS1, active high.
    pub chip_select1: EnabledHigh,
    /// CS2B, active low.
    pub chip_select2: EnabledLow,
    pub data: BusConnector<u8>,
    /// IRQB output, active low.
    pub irq: EnabledLow,
    /// RESB, active low.
    pub reset: EnabledLow,
    /// RS0-RS3.
    pub register_select: [EnabledHigh; 4],
    /// R/WB: enabled (low) means write.
    pub read_write: EnabledLow,
}

/// WDC 65C22 Versatile Interface Adapter.
#[derive(Debug)]
pub struct Via {
    label: &'static str,
    pub pins: ViaPins,
    pub(crate) regs: Registers,
    port_a: Port,
    port_b: Port,
    pub(crate) control_a: ControlLines,
    pub(crate) control_b: ControlLines,
    pub(crate) latches_a: Latches,
    pub(crate) latches_b: Latches,
    pub(crate) timer1: Timer,
    pub(crate) timer2: Timer,
    pub(crate) shifter: Shifter,
}

impl Via {
    /// A chip with nothing wired. `label` names it in trace output.
    #[must_use]
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            pins: ViaPins::default(),
            regs: Registers::default(),
            port_a: Port::new(PortSide::A),
            port_b: Port::new(PortSide::B),
            control_a: ControlLines::new(PortSide::A),
            control_b: ControlLines::new(PortSide::B),
            latches_a: Latches::new(PortSide::A),
            latches_b: Latches::new(PortSide::B),
            timer1: Timer::new(TimerId::One),
            timer2: Timer::new(TimerId::Two),
            shifter: Shifter::new(),
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// PA0-PA7 or PB0-PB7.
    pub fn port_pins(&mut self, side: PortSide) -> &mut BusConnector<u8> {
        match side {
            PortSide::A => &mut self.port_a.pins,
            PortSide::B => &mut self.port_b.pins,
        }
    }

    /// CA1/CA2 or CB1/CB2, both active high.
    pub fn control_pins(&mut self, side: PortSide) -> &mut [EnabledHigh; 2] {
        match side {
            PortSide::A => &mut self.control_a.lines,
            PortSide::B => &mut self.control_b.lines,
        }
    }

    #[must_use]
    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    #[must_use]
    pub fn interrupts(&self) -> &InterruptFlags {
        &self.regs.interrupts
    }

    /// IFR bit 7: the chip is requesting an interrupt.
    #[must_use]
    pub fn irq_asserted(&self) -> bool {
        self.regs.interrupts.irq()
    }

    /// Run one clock cycle.
    ///
    /// The steps run in a fixed order; each one sees what the previous ones
    /// did this cycle, so moving any of them changes timing.
    pub fn tick(&mut self, step: &StepContext) {
        if self.pins.reset.enabled() {
            self.reset();
            self.pins.irq.set_enable(false);
            return;
        }

        // 1. Capture inputs on a latching edge before anything reads them.
        self.latches_a.latch_port(&mut self.regs, &self.port_a, &self.control_a);
        self.latches_b.latch_port(&mut self.regs, &self.port_b, &self.control_b);

        // 2. Timers.
        if self.timer1.tick(&mut self.regs, true) {
            debug!(via = self.label, cycle = step.cycle.get(), "T1 counted to zero");
        }
        let pb6 = self.port_b.pin(6);
        if self.timer2.tick(&mut self.regs, pb6) {
            debug!(via = self.label, cycle = step.cycle.get(), "T2 counted to zero");
        }

        // 3. Shift register.
        self.shifter.tick(&mut self.regs, &self.control_b);

        // 4. Bus access.
        if self.selected() {
            let register = self.selected_register();
            if self.pins.read_write.enabled() {
                let value = self.pins.data.read();
                trace!(via = self.label, cycle = step.cycle.get(), ?register, value, "write");
                self.write(register, value);
            } else {
                let value = self.read(register);
                trace!(via = self.label, cycle = step.cycle.get(), ?register, value, "read");
                self.pins.data.write(value);
            }
        }

        // 5. Outputs only reach the pins while the chip is addressed.
        if self.selected() {
            self.port_a.write_output_register(self.regs.ora, self.regs.ddra);
            let ddrb = if self.regs.pb7_driven_by_timer1() {
                self.regs.ddrb & 0x7F
            } else {
                self.regs.ddrb
            };
            self.port_b.write_output_register(self.regs.orb, ddrb);
        }

        // 6. PB7.
        self.timer1.set_control_line_based_on_status(&self.regs, &self.port_b.pins);
        self.timer2.set_control_line_based_on_status(&self.regs, &self.port_b.pins);

        // 7. Shift clock and data.
        if self
            .shifter
            .set_control_lines_based_on_status(&mut self.regs, &self.timer2, &self.control_b)
        {
            debug!(
                via = self.label,
                cycle = step.cycle.get(),
                value = self.regs.shift_register,
                "shift register complete"
            );
        }

        // 8. CA2/CB2 outputs.
        self.latches_a.set_output(&self.regs, &self.control_a);
        self.latches_b.set_output(&self.regs, &self.control_b);

        // 9-10. Edges, then remember this cycle's levels.
        self.control_a.set_interrupt_flag_on_transition(&mut self.regs);
        self.control_b.set_interrupt_flag_on_transition(&mut self.regs);
        self.control_a.store_previous_values();
        self.control_b.store_previous_values();

        // 11. IRQB.
        self.pins.irq.set_enable(self.regs.interrupts.irq());
    }

    /// Hardware reset.
    ///
    /// Clears the port, direction, control and interrupt registers and stops
    /// both timers and the shift register. Counters, latches and the shift
    /// register contents survive.
    pub fn reset(&mut self) {
        let regs = &mut self.regs;
        regs.ora = 0;
        regs.orb = 0;
        regs.ddra = 0;
        regs.ddrb = 0;
        regs.acr = 0;
        regs.pcr = 0;
        regs.interrupts = InterruptFlags::new();
        self.timer1.disable();
        self.timer2.disable();
        self.shifter.disable();
        self.latches_a = Latches::new(PortSide::A);
        self.latches_b = Latches::new(PortSide::B);
        debug!(via = self.label, "reset");
    }

    /// Register read with all of its side effects, as a bus read cycle
    /// would perform it.
    pub fn read(&mut self, register: Register) -> u8 {
        match register {
            Register::Orb => {
                self.access_port_data(PortSide::B, true);
                self.read_port(PortSide::B)
            }
            Register::Ora => {
                self.access_port_data(PortSide::A, true);
                self.read_port(PortSide::A)
            }
            Register::OraNoHandshake => {
                self.access_port_data(PortSide::A, false);
                self.read_port(PortSide::A)
            }
            Register::Ddrb => self.regs.ddrb,
            Register::Ddra => self.regs.ddra,
            Register::T1CounterLow => {
                self.regs.interrupts.clear_flag(interrupts::T1);
                self.regs.t1.counter_low()
            }
            Register::T1CounterHigh => self.regs.t1.counter_high(),
            Register::T1LatchLow => self.regs.t1.low_latch,
            Register::T1LatchHigh => self.regs.t1.high_latch,
            Register::T2CounterLow => {
                self.regs.interrupts.clear_flag(interrupts::T2);
                self.regs.t2.counter_low()
            }
            Register::T2CounterHigh => self.regs.t2.counter_high(),
            Register::ShiftRegister => {
                self.regs.interrupts.clear_flag(interrupts::SR);
                self.shifter.rearm();
                self.regs.shift_register
            }
            Register::Acr => self.regs.acr,
            Register::Pcr => self.regs.pcr,
            Register::Ifr => self.regs.interrupts.flags(),
            Register::Ier => self.regs.interrupts.read_enable(),
        }
    }

    /// Register write with all of its side effects.
    pub fn write(&mut self, register: Register, value: u8) {
        match register {
            Register::Orb => {
                self.regs.orb = value;
                self.access_port_data(PortSide::B, true);
            }
            Register::Ora => {
                self.regs.ora = value;
                self.access_port_data(PortSide::A, true);
            }
            Register::OraNoHandshake => {
                self.regs.ora = value;
                self.access_port_data(PortSide::A, false);
            }
            Register::Ddrb => self.regs.ddrb = value,
            Register::Ddra => self.regs.ddra = value,
            Register::T1CounterLow => {
                self.regs.t1.low_latch = value;
                self.regs.interrupts.clear_flag(interrupts::T1);
            }
            Register::T1CounterHigh => self.timer1.write_counter_high(&mut self.regs, value),
            Register::T1LatchLow => self.regs.t1.low_latch = value,
            Register::T1LatchHigh => {
                self.regs.t1.high_latch = value;
                self.regs.interrupts.clear_flag(interrupts::T1);
            }
            Register::T2CounterLow => {
                self.regs.t2.low_latch = value;
                self.regs.interrupts.clear_flag(interrupts::T2);
            }
            Register::T2CounterHigh => self.timer2.write_counter_high(&mut self.regs, value),
            Register::ShiftRegister => {
                self.regs.shift_register = value;
                self.regs.interrupts.clear_flag(interrupts::SR);
                self.shifter.rearm();
            }
            Register::Acr => self.regs.acr = value,
            Register::Pcr => self.regs.pcr = value,
            Register::Ifr => self.regs.interrupts.write_flags(value),
            Register::Ier => self.regs.interrupts.set_enable(value),
        }
    }

    fn selected(&self) -> bool {
        self.pins.chip_select1.enabled() && self.pins.chip_select2.enabled()
    }

    fn selected_register(&self) -> Register {
        let select = self
            .pins
            .register_select
            .iter()
            .enumerate()
            .fold(0u8, |acc, (bit, pin)| acc | (u8::from(pin.enabled()) << bit));
        Register::from_select(select)
    }

    /// Flag clearing and handshake start for a data-register access.
    fn access_port_data(&mut self, side: PortSide, handshake: bool) {
        let (port, latches) = match side {
            PortSide::A => (&self.port_a, &mut self.latches_a),
            PortSide::B => (&self.port_b, &mut self.latches_b),
        };
        if !handshake {
            self.regs.interrupts.clear_flag(side.line1_flag());
            return;
        }
        port.clear_control_lines_interrupt_flag_on_rw(&mut self.regs);
        if latches.output_mode(self.regs.pcr).is_handshake() {
            latches.init_handshake();
        }
    }

    /// Value the CPU sees on a port data read: output bits from the output
    /// register, input bits from the input latch or the pins.
    fn read_port(&self, side: PortSide) -> u8 {
        let (port, latches) = match side {
            PortSide::A => (&self.port_a, &self.latches_a),
            PortSide::B => (&self.port_b, &self.latches_b),
        };
        let ddr = self.regs.ddr(side);
        let input = if latches.is_latching_enabled(self.regs.acr) {
            self.regs.input(side)
        } else {
            port.read_pins(ddr)
        };
        let value = (input & !ddr) | (self.regs.output(side) & ddr);
        if side == PortSide::B && self.regs.pb7_driven_by_timer1() {
            (value & 0x7F) | (u8::from(self.timer1.pb7_level()) << 7)
        } else {
            value
        }
    }
}

impl Default for Via {
    fn default() -> Self {
        Self::new("via")
    }
}

impl Tickable for Via {
    fn tick(&mut self, step: &StepContext) {
        Via::tick(self, step);
    }
}

impl Observable for Via {
    fn query(&self, path: &str) -> Option<Value> {
        let regs = &self.regs;
        match path {
            "ora" => Some(regs.ora.into()),
            "orb" => Some(regs.orb.into()),
            "ira" => Some(regs.ira.into()),
            "irb" => Some(regs.irb.into()),
            "ddra" => Some(regs.ddra.into()),
            "ddrb" => Some(regs.ddrb.into()),
            "acr" => Some(regs.acr.into()),
            "pcr" => Some(regs.pcr.into()),
            "ifr" => Some(regs.interrupts.flags().into()),
            "ier" => Some(regs.interrupts.read_enable().into()),
            "irq" => Some(self.irq_asserted().into()),
            "sr" => Some(regs.shift_register.into()),
            "sr.enabled" => Some(self.shifter.enabled().into()),
            "sr.bit_count" => Some(self.shifter.bit_count().into()),
            "t1.counter" => Some(regs.t1.counter.into()),
            "t1.latch" => Some(regs.t1.latch().into()),
            "t1.enabled" => Some(self.timer1.enabled().into()),
            "t1.pb7" => Some(self.timer1.pb7_level().into()),
            "t2.counter" => Some(regs.t2.counter.into()),
            "t2.latch" => Some(regs.t2.latch().into()),
            "t2.enabled" => Some(self.timer2.enabled().into()),
            _ => None,
        }
    }

    fn query_paths(&self) -> &'static [&'static str] {
        &[
            "ora",
            "orb",
            "ira",
            "irb",
            "ddra",
            "ddrb",
            "acr",
            "pcr",
            "ifr",
            "ier",
            "irq",
            "sr",
            "sr.enabled",
            "sr.bit_count",
            "t1.counter",
            "t1.latch",
            "t1.enabled",
            "t1.pb7",
            "t2.counter",
            "t2.latch",
            "t2.enabled",
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer1_read_low_clears_irq() {
        let mut via = Via::new("test");
        via.regs.interrupts.set_flag(interrupts::T1);
        let _ = via.read(Register::T1CounterLow);
        assert!(!via.regs.interrupts.is_set(interrupts::T1));
    }

    #[test]
    fn timer1_latch_write_does_not_start() {
        let mut via = Via::new("test");
        via.write(Register::T1LatchLow, 0x10);
        via.write(Register::T1LatchHigh, 0x00);
        assert!(!via.timer1.enabled());

        via.regs.interrupts.set_flag(interrupts::T1);
        via.write(Register::T1LatchHigh, 0x00);
        assert!(!via.regs.interrupts.is_set(interrupts::T1));
        assert_eq!(via.regs.t1.latch(), 0x0010);
    }

    #[test]
    fn timer1_counter_high_loads_from_low_latch() {
        let mut via = Via::new("test");
        via.write(Register::T1CounterLow, 0x34);
        via.regs.interrupts.set_flag(interrupts::T1);
        via.write(Register::T1CounterHigh, 0x12);
        assert_eq!(via.regs.t1.counter, 0x1234);
        assert!(via.timer1.enabled());
        assert!(!via.regs.interrupts.is_set(interrupts::T1));
    }

    #[test]
    fn ier_reads_with_bit7_set() {
        let mut via = Via::new("test");
        via.write(Register::Ier, 0x80 | 0x42);
        assert_eq!(via.read(Register::Ier), 0xC2);
    }

    #[test]
    fn reading_ora_clears_ca_flags() {
        let mut via = Via::new("test");
        via.regs.interrupts.set_flag(interrupts::CA1 | interrupts::CA2 | interrupts::T2);
        let _ = via.read(Register::Ora);
        assert!(!via.regs.interrupts.is_set(interrupts::CA1 | interrupts::CA2));
        assert!(via.regs.interrupts.is_set(interrupts::T2));
    }

    #[test]
    fn independent_ca2_survives_ora_access() {
        let mut via = Via::new("test");
        via.write(Register::Pcr, 0x02);
        via.regs.interrupts.set_flag(interrupts::CA1 | interrupts::CA2);
        via.write(Register::Ora, 0x00);
        assert!(!via.regs.interrupts.is_set(interrupts::CA1));
        assert!(via.regs.interrupts.is_set(interrupts::CA2));
    }

    #[test]
    fn no_handshake_alias_clears_only_ca1() {
        let mut via = Via::new("test");
        via.write(Register::Pcr, 0x08);
        via.regs.interrupts.set_flag(interrupts::CA1 | interrupts::CA2);
        let _ = via.read(Register::OraNoHandshake);
        assert!(!via.regs.interrupts.is_set(interrupts::CA1));
        assert!(via.regs.interrupts.is_set(interrupts::CA2));
        assert_eq!(via.latches_a, Latches::new(PortSide::A));
    }

    #[test]
    fn reading_orb_clears_cb_flags() {
        let mut via = Via::new("test");
        via.regs.interrupts.set_flag(interrupts::CB1 | interrupts::CB2 | interrupts::T1);
        let _ = via.read(Register::Orb);
        assert!(!via.regs.interrupts.is_set(interrupts::CB1 | interrupts::CB2));
        assert!(via.regs.interrupts.is_set(interrupts::T1));
    }

    #[test]
    fn shift_register_access_rearms() {
        let mut via = Via::new("test");
        via.regs.interrupts.set_flag(interrupts::SR);
        via.write(Register::ShiftRegister, 0x5A);
        assert!(via.shifter.enabled());
        assert_eq!(via.shifter.bit_count(), 0);
        assert!(!via.regs.interrupts.is_set(interrupts::SR));
        assert_eq!(via.read(Register::ShiftRegister), 0x5A);
    }

    #[test]
    fn reset_keeps_timers_and_shift_register() {
        let mut via = Via::new("test");
        via.write(Register::Ddra, 0xFF);
        via.write(Register::Acr, 0xC0);
        via.write(Register::Ier, 0xFF);
        via.write(Register::T1CounterLow, 0x20);
        via.write(Register::T1CounterHigh, 0x01);
        via.write(Register::ShiftRegister, 0x99);

        via.reset();

        assert_eq!(via.regs.ddra, 0);
        assert_eq!(via.regs.acr, 0);
        assert_eq!(via.regs.interrupts.read_enable(), 0x80);
        assert_eq!(via.regs.t1.counter, 0x0120);
        assert_eq!(via.regs.shift_register, 0x99);
        assert!(!via.timer1.enabled());
        assert!(!via.shifter.enabled());
    }

    #[test]
    fn every_query_path_answers() {
        let via = Via::new("test");
        for path in via.query_paths() {
            assert!(via.query(path).is_some(), "{path}");
        }
        assert_eq!(via.query("t1.counter"), Some(Value::U16(0xFFFF)));
        assert_eq!(via.query("bogus"), None);
    }
}
