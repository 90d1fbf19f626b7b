//! Chip-side pin connectors.
//!
//! A connector is how a chip sees a line. It translates between the pin's
//! logical "enabled" state and the electrical level, and it holds only a weak
//! reference: an unconnected pin (or one whose line has been dropped) reads as
//! not enabled and ignores writes. Callers cannot tell an unconnected pin from
//! one held at the neutral level, the same ambiguity an undriven pin has on
//! real hardware.

use std::fmt;
use std::marker::PhantomData;
use std::rc::{Rc, Weak};

use crate::bus::{Bus, BusInner, BusWidth};
use crate::line::{Line, Signal};

/// Pin polarity.
pub trait Polarity {
    /// Electrical level that represents `enabled`.
    fn level(enabled: bool) -> bool;
}

/// Enabled when the line is high.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveHigh;

/// Enabled when the line is low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveLow;

impl Polarity for ActiveHigh {
    fn level(enabled: bool) -> bool {
        enabled
    }
}

impl Polarity for ActiveLow {
    fn level(enabled: bool) -> bool {
        !enabled
    }
}

/// A single-bit pin of polarity `P`.
pub struct Connector<P: Polarity> {
    line: Option<Weak<dyn Signal>>,
    polarity: PhantomData<P>,
}

/// Pin that is enabled when its line is high.
pub type EnabledHigh = Connector<ActiveHigh>;
/// Pin that is enabled when its line is low.
pub type EnabledLow = Connector<ActiveLow>;

impl<P: Polarity> Connector<P> {
    /// An unconnected pin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            line: None,
            polarity: PhantomData,
        }
    }

    /// Wire this pin to `line`, replacing any previous connection.
    pub fn connect(&mut self, line: &Line) {
        self.line = Some(Rc::downgrade(line.signal()));
    }

    pub fn disconnect(&mut self) {
        self.line = None;
    }

    /// True while the pin has a live line.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.signal().is_some()
    }

    /// Logical state of the pin; `false` when unconnected.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.signal()
            .is_some_and(|signal| signal.status() == P::level(true))
    }

    /// Drive the line to the level meaning `enabled`. No-op when unconnected.
    pub fn set_enable(&self, enabled: bool) {
        if let Some(signal) = self.signal() {
            signal.set(P::level(enabled));
        }
    }

    fn signal(&self) -> Option<Rc<dyn Signal>> {
        self.line.as_ref().and_then(Weak::upgrade)
    }
}

impl<P: Polarity> Default for Connector<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Polarity> fmt::Debug for Connector<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("connected", &self.is_connected())
            .field("enabled", &self.enabled())
            .finish()
    }
}

/// Chip-side handle onto a [`Bus`].
pub struct BusConnector<W: BusWidth> {
    bus: Option<Weak<BusInner<W>>>,
}

impl<W: BusWidth> BusConnector<W> {
    #[must_use]
    pub fn new() -> Self {
        Self { bus: None }
    }

    pub fn connect(&mut self, bus: &Bus<W>) {
        self.bus = Some(Rc::downgrade(bus.inner()));
    }

    pub fn disconnect(&mut self) {
        self.bus = None;
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner().is_some()
    }

    /// Sample the bus; zero when unconnected.
    #[must_use]
    pub fn read(&self) -> W {
        self.inner().map_or_else(W::default, |bus| bus.read())
    }

    /// Drive the whole bus. No-op when unconnected.
    pub fn write(&self, value: W) {
        if let Some(bus) = self.inner() {
            bus.write(value);
        }
    }

    /// Drive a single line of the bus. Out-of-range bits are ignored.
    pub fn set_bit(&self, n: u8, level: bool) {
        let Some(bus) = self.inner() else {
            return;
        };
        if let Some(line) = bus.line(n) {
            line.set(level);
        }
    }

    fn inner(&self) -> Option<Rc<BusInner<W>>> {
        self.bus.as_ref().and_then(Weak::upgrade)
    }
}

impl<W: BusWidth> Default for BusConnector<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: BusWidth> fmt::Debug for BusConnector<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BusConnector")
            .field("connected", &self.is_connected())
            .field("value", &self.read())
            .finish()
    }
}
