//! Single-bit signal lines.
//!
//! A line is a wire shared by every pin connected to it. Chips talk to each
//! other by driving and sampling the same lines; there is no event machinery
//! on top. Lines are single-threaded (`Rc` + `Cell`) and live as long as the
//! circuit holds a handle to them.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Something that carries one bit of electrical state.
///
/// Implemented by free-standing wires and by the per-bit views of a
/// [`Bus`](crate::Bus).
pub(crate) trait Signal {
    fn status(&self) -> bool;
    fn set(&self, level: bool);
}

/// A free-standing wire.
#[derive(Default)]
struct Wire {
    level: Cell<bool>,
}

impl Signal for Wire {
    fn status(&self) -> bool {
        self.level.get()
    }

    fn set(&self, level: bool) {
        self.level.set(level);
    }
}

/// An active-high signal line.
///
/// Cloning a `Line` yields another handle onto the same wire. Connectors hold
/// weak references, so the line disappears (and its connectors read as
/// disconnected) once every `Line` handle has been dropped.
#[derive(Clone)]
pub struct Line {
    signal: Rc<dyn Signal>,
}

impl Line {
    /// A new wire, initially low.
    #[must_use]
    pub fn new() -> Self {
        Self::from_signal(Rc::new(Wire::default()))
    }

    /// A new wire at the given level.
    #[must_use]
    pub fn with_level(level: bool) -> Self {
        let line = Self::new();
        line.set(level);
        line
    }

    pub(crate) fn from_signal(signal: Rc<dyn Signal>) -> Self {
        Self { signal }
    }

    pub(crate) fn signal(&self) -> &Rc<dyn Signal> {
        &self.signal
    }

    /// Current level (true = high).
    #[must_use]
    pub fn status(&self) -> bool {
        self.signal.status()
    }

    /// Drive the line to `level`.
    pub fn set(&self, level: bool) {
        self.signal.set(level);
    }

    /// Invert the current level.
    pub fn toggle(&self) {
        self.signal.set(!self.signal.status());
    }
}

impl Default for Line {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Line").field("status", &self.status()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_line_is_low() {
        assert!(!Line::new().status());
        assert!(Line::with_level(true).status());
    }

    #[test]
    fn clones_share_the_wire() {
        let a = Line::new();
        let b = a.clone();
        a.set(true);
        assert!(b.status());
        b.toggle();
        assert!(!a.status());
    }
}
