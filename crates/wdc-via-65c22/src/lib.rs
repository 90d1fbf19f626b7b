//! WDC 65C22 Versatile Interface Adapter (VIA).
//!
//! Two 8-bit I/O ports with handshaking control lines, two 16-bit interval
//! timers, an 8-bit serial shift register and an interrupt controller. The
//! chip talks to the rest of the board only through its pins: it samples and
//! drives shared lines once per [`tick`](Via::tick), exactly as the CPU sees
//! it over the data bus.
//!
//! # Registers ($0-$F)
//!
//! | Reg | Name | Description                                   |
//! |-----|------|-----------------------------------------------|
//! | $0  | ORB  | Port B data (IRB on read)                     |
//! | $1  | ORA  | Port A data, with CA2 handshake               |
//! | $2  | DDRB | Port B data direction (1 = output)            |
//! | $3  | DDRA | Port A data direction (1 = output)            |
//! | $4  | T1CL | T1 counter low on read, low latch on write    |
//! | $5  | T1CH | T1 counter high (write loads and starts T1)   |
//! | $6  | T1LL | T1 low latch                                  |
//! | $7  | T1LH | T1 high latch (write clears T1 flag)          |
//! | $8  | T2CL | T2 counter low on read, low latch on write    |
//! | $9  | T2CH | T2 counter high (write loads and starts T2)   |
//! | $A  | SR   | Shift register (any access starts a transfer) |
//! | $B  | ACR  | Auxiliary control register                    |
//! | $C  | PCR  | Peripheral control register                   |
//! | $D  | IFR  | Interrupt flag register                       |
//! | $E  | IER  | Interrupt enable register                     |
//! | $F  | ORA  | Port A data, no handshake                     |
//!
//! # Wiring
//!
//! ```
//! use emu_core::{Bus8, Clock, Line, MasterClock, Tickable, Ticks};
//! use wdc_via_65c22::{PortSide, Via};
//!
//! let data = Bus8::new();
//! let port_a = Bus8::new();
//! let irq = Line::with_level(true);
//!
//! let mut via = Via::new("via1");
//! via.pins.data.connect(&data);
//! via.port_pins(PortSide::A).connect(&port_a);
//! via.pins.irq.connect(&irq);
//!
//! let mut clock = Clock::new(MasterClock::new(1_000_000));
//! via.run(&mut clock, Ticks::new(10));
//! assert!(irq.status());
//! ```

mod control_lines;
mod error;
pub mod interrupts;
mod latches;
mod port;
mod registers;
mod shifter;
mod snapshot;
mod timer;
mod via;

pub use control_lines::Line2Mode;
pub use error::{Result, ViaError};
pub use interrupts::InterruptFlags;
pub use registers::{PortSide, Register, Registers, TimerRegisters};
pub use shifter::{ShiftClock, ShiftMode};
pub use snapshot::ViaSnapshot;
pub use timer::{TimerId, TimerMode};
pub use via::{Via, ViaPins};
