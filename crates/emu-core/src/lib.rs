//! Core types for cycle-accurate emulation of a 65xx breadboard computer.
//!
//! Chips never call each other. They share [`Line`]s and [`Bus`]es, see them
//! through polarity-aware [`Connector`]s, and are all stepped once per cycle
//! of the board [`Clock`].

mod bus;
mod clock;
mod connector;
mod line;
mod observable;
mod tickable;
mod ticks;

pub use bus::{Bus, Bus8, Bus16, BusWidth};
pub use clock::{Clock, MasterClock, StepContext};
pub use connector::{ActiveHigh, ActiveLow, BusConnector, Connector, EnabledHigh, EnabledLow, Polarity};
pub use line::Line;
pub use observable::{Observable, Value};
pub use tickable::Tickable;
pub use ticks::Ticks;
