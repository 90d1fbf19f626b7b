//! Multi-bit signal buses.
//!
//! A bus is a group of lines read and written as one value: the 8-bit data
//! bus, the 16-bit address bus, or an 8-bit peripheral port. Each bit can also
//! be taken out as a [`Line`] and wired to a single-bit pin.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::line::{Line, Signal};

/// A bus width: an unsigned integer with addressable bits.
pub trait BusWidth: Copy + Default + PartialEq + fmt::Debug + 'static {
    /// Number of lines on a bus of this width.
    const BITS: u8;

    /// Level of bit `n`.
    fn bit(self, n: u8) -> bool;

    /// `self` with bit `n` forced to `level`.
    #[must_use]
    fn with_bit(self, n: u8, level: bool) -> Self;
}

macro_rules! impl_bus_width {
    ($($ty:ty),*) => {
        $(
            impl BusWidth for $ty {
                const BITS: u8 = <$ty>::BITS as u8;

                fn bit(self, n: u8) -> bool {
                    (self >> n) & 1 == 1
                }

                fn with_bit(self, n: u8, level: bool) -> Self {
                    if level {
                        self | (1 << n)
                    } else {
                        self & !(1 << n)
                    }
                }
            }
        )*
    };
}

impl_bus_width!(u8, u16);

/// One bit of a bus, seen as a line. Writes leave the other bits alone.
struct BusLine<W: BusWidth> {
    value: Rc<Cell<W>>,
    bit: u8,
}

impl<W: BusWidth> Signal for BusLine<W> {
    fn status(&self) -> bool {
        self.value.get().bit(self.bit)
    }

    fn set(&self, level: bool) {
        self.value.set(self.value.get().with_bit(self.bit, level));
    }
}

pub(crate) struct BusInner<W: BusWidth> {
    value: Rc<Cell<W>>,
    lines: Vec<Line>,
}

impl<W: BusWidth> BusInner<W> {
    pub(crate) fn read(&self) -> W {
        self.value.get()
    }

    pub(crate) fn write(&self, value: W) {
        self.value.set(value);
    }

    pub(crate) fn line(&self, n: u8) -> Option<&Line> {
        self.lines.get(usize::from(n))
    }
}

/// A bus of `W::BITS` lines.
///
/// Cloning shares the same bus.
pub struct Bus<W: BusWidth> {
    inner: Rc<BusInner<W>>,
}

/// 8-bit data or port bus.
pub type Bus8 = Bus<u8>;
/// 16-bit address bus.
pub type Bus16 = Bus<u16>;

impl<W: BusWidth> Bus<W> {
    /// A new bus with every line low.
    #[must_use]
    pub fn new() -> Self {
        let value = Rc::new(Cell::new(W::default()));
        let lines = (0..W::BITS)
            .map(|bit| {
                Line::from_signal(Rc::new(BusLine {
                    value: Rc::clone(&value),
                    bit,
                }))
            })
            .collect();
        Self {
            inner: Rc::new(BusInner { value, lines }),
        }
    }

    /// Drive the whole bus.
    pub fn write(&self, value: W) {
        self.inner.write(value);
    }

    /// Sample the whole bus.
    #[must_use]
    pub fn read(&self) -> W {
        self.inner.read()
    }

    /// The line carrying bit `n`, or `None` if `n` is past the bus width.
    #[must_use]
    pub fn line(&self, n: u8) -> Option<Line> {
        self.inner.line(n).cloned()
    }

    pub(crate) fn inner(&self) -> &Rc<BusInner<W>> {
        &self.inner
    }
}

impl<W: BusWidth> Clone for Bus<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<W: BusWidth> Default for Bus<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: BusWidth> fmt::Debug for Bus<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bus").field("value", &self.read()).finish()
    }
}
