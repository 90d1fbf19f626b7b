//! A VIA on a minimal breadboard: every pin wired to its own line or bus,
//! with helpers that drive the bus the way a CPU cycle would.

#![allow(dead_code)]

use emu_core::{Bus8, Clock, Line, MasterClock, Tickable, Ticks};
use wdc_via_65c22::{PortSide, Register, Via};

pub struct Board {
    pub via: Via,
    pub clock: Clock,
    pub data: Bus8,
    pub address: Bus8,
    pub port_a: Bus8,
    pub port_b: Bus8,
    pub cs1: Line,
    pub cs2: Line,
    pub rw: Line,
    pub irq: Line,
    pub reset: Line,
    pub ca1: Line,
    pub ca2: Line,
    pub cb1: Line,
    pub cb2: Line,
}

impl Board {
    pub fn new() -> Self {
        let board = Self {
            via: Via::new("test"),
            clock: Clock::new(MasterClock::new(1_000_000)),
            data: Bus8::new(),
            address: Bus8::new(),
            port_a: Bus8::new(),
            port_b: Bus8::new(),
            cs1: Line::new(),
            cs2: Line::with_level(true),
            rw: Line::with_level(true),
            irq: Line::with_level(true),
            reset: Line::with_level(true),
            ca1: Line::new(),
            ca2: Line::new(),
            cb1: Line::new(),
            cb2: Line::new(),
        };
        board.wire()
    }

    fn wire(mut self) -> Self {
        let pins = &mut self.via.pins;
        pins.chip_select1.connect(&self.cs1);
        pins.chip_select2.connect(&self.cs2);
        pins.read_write.connect(&self.rw);
        pins.irq.connect(&self.irq);
        pins.reset.connect(&self.reset);
        pins.data.connect(&self.data);
        for (n, pin) in pins.register_select.iter_mut().enumerate() {
            pin.connect(&self.address.line(n as u8).unwrap());
        }
        self.via.port_pins(PortSide::A).connect(&self.port_a);
        self.via.port_pins(PortSide::B).connect(&self.port_b);
        let [ca1, ca2] = self.via.control_pins(PortSide::A);
        ca1.connect(&self.ca1);
        ca2.connect(&self.ca2);
        let [cb1, cb2] = self.via.control_pins(PortSide::B);
        cb1.connect(&self.cb1);
        cb2.connect(&self.cb2);
        self
    }

    /// One cycle with the chip deselected.
    pub fn tick(&mut self) {
        self.via.run(&mut self.clock, Ticks::new(1));
    }

    pub fn idle(&mut self, cycles: u64) {
        self.via.run(&mut self.clock, Ticks::new(cycles));
    }

    /// One selected write cycle.
    pub fn write(&mut self, register: Register, value: u8) {
        self.select(register);
        self.rw.set(false);
        self.data.write(value);
        self.tick();
        self.deselect();
    }

    /// One selected read cycle; returns what the chip put on the data bus.
    pub fn read(&mut self, register: Register) -> u8 {
        self.select(register);
        self.rw.set(true);
        self.tick();
        self.deselect();
        self.data.read()
    }

    /// IRQB is active low.
    pub fn irq_asserted(&self) -> bool {
        !self.irq.status()
    }

    fn select(&mut self, register: Register) {
        self.address.write(register.select());
        self.cs1.set(true);
        self.cs2.set(false);
    }

    fn deselect(&mut self) {
        self.cs1.set(false);
        self.cs2.set(true);
        self.rw.set(true);
    }
}
